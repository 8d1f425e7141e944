use scraper::{ElementRef, Html};

#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Other,
}

impl<'a> Node<'a> {
    pub fn element(&self) -> Option<ElementRef<'a>> {
        match self {
            Node::Element(el) => Some(*el),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> Option<&'a str> {
        match self {
            Node::Element(el) => Some(el.value().name()),
            _ => None,
        }
    }
}

/// Every node of a parsed page in document order (depth-first, pre-order).
///
/// Walking outward from a node is plain index arithmetic on this list, so the
/// neighbours of a node never depend on the parser's sibling links.
#[derive(Debug)]
pub struct DocumentOrder<'a> {
    nodes: Vec<Node<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the document start.
    Backward,
    /// Toward the document end.
    Forward,
}

impl<'a> DocumentOrder<'a> {
    pub fn new(doc: &'a Html) -> DocumentOrder<'a> {
        let nodes = doc
            .tree
            .root()
            .descendants()
            .map(|node| {
                if let Some(el) = ElementRef::wrap(node) {
                    Node::Element(el)
                } else if let Some(text) = node.value().as_text() {
                    Node::Text(&**text)
                } else {
                    Node::Other
                }
            })
            .collect();
        DocumentOrder { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node<'a>> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Node<'a>)> {
        self.nodes.iter().enumerate()
    }

    /// Indices of the nodes met when moving away from `from`, nearest first.
    pub fn walk(&self, from: usize, direction: Direction) -> Box<dyn Iterator<Item = usize>> {
        match direction {
            Direction::Backward => Box::new((0..from.min(self.nodes.len())).rev()),
            Direction::Forward => Box::new(from.saturating_add(1)..self.nodes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(order: &DocumentOrder) -> Vec<String> {
        order
            .iter()
            .filter_map(|(_, n)| match n {
                Node::Text(t) => Some(t.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn nodes_are_in_pre_order() {
        let html = Html::parse_document(
            "<html><body><div>a<p>b</p>c</div><ul><li>d</li></ul></body></html>",
        );
        let order = DocumentOrder::new(&html);

        let tags: Vec<&str> = order.iter().filter_map(|(_, n)| n.tag_name()).collect();
        assert_eq!(tags, vec!["html", "head", "body", "div", "p", "ul", "li"]);
        assert_eq!(texts(&order), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn walk_moves_outward_nearest_first() {
        let html = Html::parse_document("<p>one</p><p>two</p>");
        let order = DocumentOrder::new(&html);
        let p = order
            .iter()
            .filter(|(_, n)| n.tag_name() == Some("p"))
            .map(|(i, _)| i)
            .last()
            .unwrap();

        let backward: Vec<usize> = order.walk(p, Direction::Backward).collect();
        assert_eq!(backward.first(), Some(&(p - 1)));
        assert_eq!(backward.last(), Some(&0));
        assert_eq!(backward.len(), p);

        let forward: Vec<usize> = order.walk(p, Direction::Forward).collect();
        assert_eq!(forward, ((p + 1)..order.len()).collect::<Vec<_>>());
    }

    #[test]
    fn walk_past_the_ends_is_empty() {
        let html = Html::parse_document("");
        let order = DocumentOrder::new(&html);
        assert_eq!(order.walk(0, Direction::Backward).count(), 0);
        assert_eq!(order.walk(order.len() - 1, Direction::Forward).count(), 0);
    }
}
