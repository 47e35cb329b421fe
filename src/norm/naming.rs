/// Picks the name a field-list entry gets in generated code.
///
/// `ident` is the declared name, `kind` the type text, `index` the number
/// of elements produced so far and `anonymous_index` the number of unnamed
/// fields seen so far.
pub trait NameStrategy {
    fn make_name(&self, ident: Option<&str>, kind: &str, index: usize, anonymous_index: usize)
        -> String;
}

impl<F> NameStrategy for F
where
    F: Fn(Option<&str>, &str, usize, usize) -> String,
{
    fn make_name(
        &self,
        ident: Option<&str>,
        kind: &str,
        index: usize,
        anonymous_index: usize,
    ) -> String {
        self(ident, kind, index, anonymous_index)
    }
}

fn declared(ident: Option<&str>) -> Option<&str> {
    ident.filter(|name| !name.is_empty())
}

/// `prefix + index + name`, or `prefix + index` for unnamed fields.
///
/// Unique by construction.
#[derive(Debug, Clone)]
pub struct PrefixNames {
    pub prefix: String,
}

impl PrefixNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl NameStrategy for PrefixNames {
    fn make_name(&self, ident: Option<&str>, _kind: &str, index: usize, _anonymous: usize) -> String {
        match declared(ident) {
            Some(name) => format!("{}{index}{name}", self.prefix),
            None => format!("{}{index}", self.prefix),
        }
    }
}

/// Keeps declared names; unnamed `error` fields become `err`, everything
/// else `prefix`, with the element index appended after the first.
#[derive(Debug, Clone)]
pub struct SimpleNames {
    pub prefix: String,
}

impl SimpleNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl NameStrategy for SimpleNames {
    fn make_name(&self, ident: Option<&str>, kind: &str, index: usize, _anonymous: usize) -> String {
        if let Some(name) = declared(ident) {
            return name.to_string();
        }
        let base = if kind == "error" { "err" } else { &self.prefix };
        if index == 0 {
            base.to_string()
        } else {
            format!("{base}{index}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_names() {
        let names = PrefixNames::new("p");
        assert_eq!(names.make_name(Some("ctx"), "context.Context", 0, 0), "p0ctx");
        assert_eq!(names.make_name(None, "int", 2, 1), "p2");
        assert_eq!(names.make_name(Some(""), "int", 3, 0), "p3");
    }

    #[test]
    fn simple_names() {
        let names = SimpleNames::new("res");
        assert_eq!(names.make_name(Some("a"), "int", 0, 0), "a");
        assert_eq!(names.make_name(None, "int", 0, 0), "res");
        assert_eq!(names.make_name(None, "string", 1, 1), "res1");
        assert_eq!(names.make_name(None, "error", 0, 0), "err");
        assert_eq!(names.make_name(None, "error", 2, 2), "err2");
    }

    #[test]
    fn closures_are_strategies() {
        let upper = |ident: Option<&str>, _: &str, idx: usize, _: usize| {
            ident.map(str::to_uppercase).unwrap_or_else(|| format!("V{idx}"))
        };
        assert_eq!(upper.make_name(Some("id"), "int", 0, 0), "ID");
        assert_eq!(upper.make_name(None, "int", 4, 0), "V4");
    }
}
