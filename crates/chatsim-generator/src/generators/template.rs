//! `{placeholder}` rendering for phrase and question templates.
//!
//! Supported placeholders: `{token}`, `{indicator}`, `{timeframe}`,
//! `{order}`, `{price}`, `{tp}`, `{stop}`. Unknown placeholders are left in
//! place.

/// Values available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateEnv {
    pub token: String,
    pub indicator: String,
    pub timeframe: String,
    pub order: String,
    pub price: String,
    pub tp: String,
    pub stop: String,
}

impl TemplateEnv {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "token" => Some(&self.token),
            "indicator" => Some(&self.indicator),
            "timeframe" => Some(&self.timeframe),
            "order" => Some(&self.order),
            "price" => Some(&self.price),
            "tp" => Some(&self.tp),
            "stop" => Some(&self.stop),
            _ => None,
        }
    }
}

/// Substitute every known `{key}` in `template`.
pub fn render_template(template: &str, env: &TemplateEnv) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if is_key(&after[..end]) => {
                let key = &after[..end];
                match env.lookup(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_key(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> TemplateEnv {
        TemplateEnv {
            token: "ETH".to_string(),
            tp: "2,100".to_string(),
            stop: "1,950.5".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_known_keys() {
        assert_eq!(
            render_template("Anyone watching {token}? TP {tp}, SL {stop}", &env()),
            "Anyone watching ETH? TP 2,100, SL 1,950.5"
        );
    }

    #[test]
    fn test_unknown_key_kept() {
        assert_eq!(render_template("{token} {moon}", &env()), "ETH {moon}");
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(render_template("{ {token", &env()), "{ {token");
        assert_eq!(render_template("{} {token}", &env()), "{} ETH");
    }
}
