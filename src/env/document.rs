/// Identifies an element in a [`Document`] head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadElement {
    Meta {
        name: String,
        content: Option<String>,
    },
    Style {
        text: String,
    },
    /// Any other head content, e.g. `title` or `link`
    Other {
        tag: String,
    },
}

/// The head of an embedded document.
#[derive(Debug, Default, Clone)]
pub struct Document {
    head: Vec<(ElementId, HeadElement)>,
    next_id: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `element` to the head.
    pub fn append(&mut self, element: HeadElement) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.head.push((id, element));
        id
    }

    pub fn remove(&mut self, id: ElementId) -> Option<HeadElement> {
        let idx = self.head.iter().position(|(el, _)| *el == id)?;
        Some(self.head.remove(idx).1)
    }

    pub fn get(&self, id: ElementId) -> Option<&HeadElement> {
        self.head.iter().find(|(el, _)| *el == id).map(|(_, el)| el)
    }

    pub fn head(&self) -> impl Iterator<Item = &HeadElement> + '_ {
        self.head.iter().map(|(_, el)| el)
    }

    pub fn len(&self) -> usize {
        self.head.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    /// The first `<meta>` with the given name, like
    /// `querySelector('meta[name="…"]')`.
    pub fn query_meta(&self, name: &str) -> Option<ElementId> {
        self.head.iter().find_map(|(id, el)| match el {
            HeadElement::Meta { name: n, .. } if n == name => Some(*id),
            _ => None,
        })
    }

    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.head.iter().find_map(|(_, el)| match el {
            HeadElement::Meta { name: n, content } if n == name => content.as_deref(),
            _ => None,
        })
    }

    /// Sets the content attribute of a meta element and returns the previous
    /// value. Returns `None` without effect if `id` is not a meta element.
    pub fn set_meta_content(
        &mut self,
        id: ElementId,
        value: Option<String>,
    ) -> Option<Option<String>> {
        self.head.iter_mut().find_map(|(el_id, el)| match el {
            HeadElement::Meta { content, .. } if *el_id == id => {
                Some(std::mem::replace(content, value.clone()))
            }
            _ => None,
        })
    }

    pub fn metas<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a HeadElement> + 'a {
        self.head()
            .filter(move |el| matches!(el, HeadElement::Meta { name: n, .. } if n == name))
    }

    pub fn styles(&self) -> impl Iterator<Item = &str> + '_ {
        self.head().filter_map(|el| match el {
            HeadElement::Style { text } => Some(text.as_str()),
            _ => None,
        })
    }
}
