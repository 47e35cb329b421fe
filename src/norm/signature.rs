use crate::go::search::FuncDecl;
use crate::norm::element::{NameTypeElements, Qualifier};
use crate::norm::generics::GenericParams;
use crate::norm::naming::SimpleNames;
use serde::Serialize;

/// Normalized view of a function or method signature, ready for code
/// generation.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSignature {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub generics: Vec<String>,
    pub params: NameTypeElements,
    pub results: NameTypeElements,
}

impl FunctionSignature {
    /// Build the signature of `func`.
    ///
    /// With `package` set, exported type names local to that package are
    /// qualified so the signature can be used from another package.
    pub fn of(func: &FuncDecl<'_>, source: &[u8], package: Option<&str>) -> Self {
        let generics = GenericParams::from_node(func.type_parameters(), source);
        let qualifier = package.map(|pkg| Qualifier::new(pkg, generics.clone()));

        let params = NameTypeElements::extract(
            func.parameters(),
            source,
            &SimpleNames::new("arg"),
            qualifier.as_ref(),
        );
        let results = NameTypeElements::extract(
            func.result(),
            source,
            &SimpleNames::new("res"),
            qualifier.as_ref(),
        );

        Self {
            name: func.name().to_string(),
            receiver: func.receiver().map(|r| r.type_name.to_string()),
            generics: generics.names().map(str::to_string).collect(),
            params,
            results,
        }
    }

    /// Call expression forwarding every parameter, e.g. `Open(ctx, opts...)`.
    pub fn call_expression(&self, callee: &str) -> String {
        format!("{callee}({})", self.params.call_arguments().merge_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::parser::GoParser;
    use crate::go::search::{function_by_name, method_by_receiver_and_name};

    const SOURCE: &[u8] = br#"package store

func Open(ctx Context, opts ...Option) (*Store, error) { return nil, nil }

func (s *Store) Get(id int) (Item, error) { return Item{}, nil }
"#;

    #[test]
    fn qualified_function_signature() {
        let parsed = GoParser::new().unwrap().parse_with_source(SOURCE).unwrap();
        let open = function_by_name(&parsed, "Open").unwrap();
        let sig = FunctionSignature::of(&open, SOURCE, Some("store"));

        assert_eq!(sig.name, "Open");
        assert_eq!(sig.receiver, None);
        assert_eq!(
            sig.params.names_with_kinds().merge_parts(),
            "ctx store.Context, opts ...store.Option"
        );
        assert_eq!(sig.results.kinds(), vec!["*store.Store", "error"]);
        assert_eq!(sig.call_expression("store.Open"), "store.Open(ctx, opts...)");
    }

    #[test]
    fn method_signature_as_json() {
        let parsed = GoParser::new().unwrap().parse_with_source(SOURCE).unwrap();
        let get = method_by_receiver_and_name(&parsed, "Store", "Get").unwrap();
        let sig = FunctionSignature::of(&get, SOURCE, None);

        assert_eq!(sig.receiver.as_deref(), Some("Store"));
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["results"][0]["name"], "res");
        assert_eq!(json["results"][1]["name"], "err1");
        assert_eq!(json["params"][0]["kind"], "int");
    }
}
