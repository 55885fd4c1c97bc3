/// Represents ways to locate an element in the fleet-operations PWA.
///
/// The target application renders hash-suffixed class names
/// (`fleet-operations-pwa__nextButton__5dy90n`), so `ClassPrefix` matches on
/// the stable leading part. `Role` pairs a tag with its exact trimmed visible
/// text, the way dialog buttons are addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by tag role and optional exact (whitespace-normalized) text
    Role { role: String, name: Option<String> },
    /// Select by the stable prefix of a hash-suffixed class name
    ClassPrefix(String),
    /// Select by exact visible text on any element
    Text(String),
    /// Select by an attribute whose value contains a substring
    Attr { name: String, contains: String },
    /// Chain multiple selectors, each scoped to the previous match
    Chain(Vec<Selector>),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    pub fn button(name: &str) -> Self {
        Selector::Role {
            role: "button".to_string(),
            name: Some(name.to_string()),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        // Handle chained selectors first
        let parts: Vec<&str> = s.split(">>").map(|p| p.trim()).collect();
        if parts.len() > 1 {
            return Selector::Chain(parts.into_iter().map(Selector::from).collect());
        }

        // role|name is the preferred precise format, e.g. "button|Next"
        if s.contains('|') {
            let parts: Vec<&str> = s.splitn(2, '|').collect();
            let role = parts[0].trim();
            let name = parts[1].trim();
            return Selector::Role {
                role: role.to_string(),
                name: if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                },
            };
        }

        match s {
            _ if s.to_lowercase().starts_with("class:") => {
                Selector::ClassPrefix(s["class:".len()..].trim().to_string())
            }
            _ if s.to_lowercase().starts_with("text:") => {
                Selector::Text(s["text:".len()..].to_string())
            }
            _ if s.to_lowercase().starts_with("attr:") => {
                // attr:placeholder*=MVA
                let body = &s["attr:".len()..];
                match body.split_once("*=") {
                    Some((name, value)) => Selector::Attr {
                        name: name.trim().to_string(),
                        contains: value.trim().to_string(),
                    },
                    None => Selector::Invalid(format!(
                        "attr selector must use name*=value form: \"{s}\""
                    )),
                }
            }
            _ if s.to_lowercase().starts_with("role:") => Selector::Role {
                role: s["role:".len()..].to_string(),
                name: None,
            },
            "button" | "input" | "img" | "h1" | "p" | "span" | "div" => Selector::Role {
                role: s.to_string(),
                name: None,
            },
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use prefixes like 'role:', 'class:', 'text:', 'attr:', or role|name."
            )),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_name_pipe_format() {
        assert_eq!(
            Selector::from("button|Add Work Item"),
            Selector::Role {
                role: "button".to_string(),
                name: Some("Add Work Item".to_string()),
            }
        );
    }

    #[test]
    fn parses_class_prefix() {
        assert_eq!(
            Selector::from("class:fleet-operations-pwa__complaintItem"),
            Selector::ClassPrefix("fleet-operations-pwa__complaintItem".to_string())
        );
    }

    #[test]
    fn parses_attr_contains() {
        assert_eq!(
            Selector::from("attr:placeholder*=MVA"),
            Selector::Attr {
                name: "placeholder".to_string(),
                contains: "MVA".to_string(),
            }
        );
    }

    #[test]
    fn parses_chain() {
        let sel = Selector::from("class:fleet-operations-pwa__complaintItem >> img");
        match sel {
            Selector::Chain(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(
                    parts[1],
                    Selector::Role {
                        role: "img".to_string(),
                        name: None
                    }
                );
            }
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn unknown_format_is_invalid() {
        assert!(matches!(
            Selector::from("totally bogus"),
            Selector::Invalid(_)
        ));
    }
}
