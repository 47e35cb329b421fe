use std::collections::BTreeMap;
use tree_sitter::Node;

/// Type parameters declared by a generic function or type, name to
/// constraint text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericParams(BTreeMap<String, String>);

impl GenericParams {
    /// Read a `type_parameter_list` node. `None` gives an empty map.
    pub fn from_node(list: Option<Node<'_>>, source: &[u8]) -> Self {
        let mut params = BTreeMap::new();
        let Some(list) = list else {
            return Self(params);
        };
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            if decl.kind() != "type_parameter_declaration" {
                continue;
            }
            let constraint = decl
                .child_by_field_name("type")
                .and_then(|n| source.get(n.byte_range()))
                .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
                .unwrap_or_default();
            let mut names = decl.walk();
            for name in decl.children_by_field_name("name", &mut names) {
                if let Some(bytes) = source.get(name.byte_range()) {
                    params.insert(
                        String::from_utf8_lossy(bytes).into_owned(),
                        constraint.clone(),
                    );
                }
            }
        }
        Self(params)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn constraint(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GenericParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
