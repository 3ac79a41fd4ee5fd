/// A single validation step applied to a field value.
///
/// Rules run in declaration order. [`Rule::Trim`] rewrites the value that
/// later rules see and that ends up in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Strip surrounding whitespace.
    Trim,
    /// Value must not be empty.
    Required,
    /// Value must contain at least this many characters.
    MinLength(usize),
    /// Value must start with `prefix`; `message` is shown otherwise.
    Prefix {
        prefix: &'static str,
        message: &'static str,
    },
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), String> {
        match *self {
            Self::Trim => Ok(()),
            Self::Required => {
                if value.is_empty() {
                    Err(min_length_message(1))
                } else {
                    Ok(())
                }
            }
            Self::MinLength(min) => {
                if value.chars().count() < min {
                    Err(min_length_message(min))
                } else {
                    Ok(())
                }
            }
            Self::Prefix { prefix, message } => {
                if value.starts_with(prefix) {
                    Ok(())
                } else {
                    Err(message.to_string())
                }
            }
        }
    }
}

fn min_length_message(min: usize) -> String {
    format!("String must contain at least {min} character(s)")
}

/// Statically declared form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub rules: &'static [Rule],
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            key,
            label,
            placeholder: "",
            rules,
        }
    }

    pub const fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Validate a raw value, returning the normalized value or the first error.
    pub fn validate(&self, raw: &str) -> Result<String, String> {
        let mut value = raw.to_string();
        for rule in self.rules {
            if *rule == Rule::Trim {
                value = value.trim().to_string();
            }
            rule.check(&value)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldSpec = FieldSpec::new("name", "Name", &[Rule::Trim, Rule::Required]);
    const VALUE: FieldSpec = FieldSpec::new(
        "value",
        "Value",
        &[
            Rule::MinLength(4),
            Rule::Prefix {
                prefix: "#",
                message: "String must be a valid hex code",
            },
        ],
    );

    #[test]
    fn test_trim_then_required() {
        assert_eq!(NAME.validate("  My Shop  "), Ok("My Shop".to_string()));
        assert!(NAME.validate("").is_err());
        assert!(NAME.validate("   \t ").is_err());
    }

    #[test]
    fn test_min_length_runs_before_prefix() {
        assert_eq!(
            VALUE.validate("#FF"),
            Err("String must contain at least 4 character(s)".to_string())
        );
        assert_eq!(
            VALUE.validate("FF0000"),
            Err("String must be a valid hex code".to_string())
        );
        assert_eq!(VALUE.validate("#FF0000"), Ok("#FF0000".to_string()));
    }

    #[test]
    fn test_untrimmed_field_keeps_whitespace() {
        assert_eq!(VALUE.validate("#FFF "), Ok("#FFF ".to_string()));
    }
}
