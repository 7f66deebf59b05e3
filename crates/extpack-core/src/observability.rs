use serde::{Deserialize, Serialize};

use crate::typed::{Handler, TypeRegistry};

/// One registered handler and its nested handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerView {
    pub code: u8,
    pub name: String,
    pub fallback: bool,
    pub predicate: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HandlerView>,
}

impl HandlerView {
    pub fn of(handler: &dyn Handler) -> Self {
        Self {
            code: handler.code(),
            name: handler.name().to_string(),
            fallback: handler.is_fallback(),
            predicate: handler.has_check(),
            children: handler.children().into_iter().map(Self::of).collect(),
        }
    }
}

/// Serializable view of a codec's registry, ordered by family code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryView {
    pub families: Vec<HandlerView>,
}

impl RegistryView {
    pub fn of(registry: &TypeRegistry) -> Self {
        Self {
            families: registry
                .families()
                .into_iter()
                .map(|h| HandlerView::of(&**h))
                .collect(),
        }
    }

    pub fn family(&self, code: u8) -> Option<&HandlerView> {
        self.families.iter().find(|f| f.code == code)
    }
}

#[cfg(test)]
mod tests {
    use crate::extension::default_codec;

    #[test]
    fn default_codec_layout() {
        let view = default_codec().unwrap().describe();
        let summary: Vec<_> = view
            .families
            .iter()
            .map(|f| {
                let subs: Vec<_> = f.children.iter().map(|c| (c.code, c.name.as_str())).collect();
                (f.code, f.name.as_str(), subs)
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                (0, "builtin", vec![(0, "complex"), (1, "timestamp"), (2, "duration")]),
                (1, "numeric", vec![(0, "scalar"), (1, "array")]),
                (2, "tabular", vec![(0, "frame"), (1, "series")]),
            ]
        );
    }

    #[test]
    fn flags_surface_from_nested_handlers() {
        let view = default_codec().unwrap().describe();
        let numeric = view.family(1).unwrap();
        assert!(numeric.predicate);
        assert!(!numeric.fallback);

        let tabular = view.family(2).unwrap();
        assert!(tabular.fallback);
        assert!(tabular.children[1].fallback);
    }

    #[test]
    fn view_serializes_to_json() {
        let json = serde_json::to_value(default_codec().unwrap().describe()).unwrap();
        assert_eq!(json["families"][0]["name"], "builtin");
        assert_eq!(json["families"][2]["children"][1]["name"], "series");
        assert!(json["families"][0]["children"][0].get("children").is_none());
    }
}
