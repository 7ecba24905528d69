/// Builds `#EXTINF:-1 key="value" ...,Title` lines with attributes in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ExtinfBuilder {
    attributes: Vec<(&'static str, String)>,
}

impl ExtinfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, key: &'static str, value: impl AsRef<str>) -> Self {
        self.attributes.push((key, sanitize_attribute(value.as_ref())));
        self
    }

    pub fn build(self, title: &str) -> String {
        let mut line = String::from("#EXTINF:-1");
        for (key, value) in self.attributes {
            line.push(' ');
            line.push_str(key);
            line.push_str("=\"");
            line.push_str(&value);
            line.push('"');
        }
        line.push(',');
        line.push_str(&single_line(title));
        line
    }
}

// Quotes would end the attribute early; newlines would split the entry.
fn sanitize_attribute(value: &str) -> String {
    single_line(value).replace('"', "'")
}

fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_attributes_in_order() {
        let line = ExtinfBuilder::new()
            .attribute("group-title", "Romania")
            .attribute("radio", "true")
            .attribute("tvg-logo", "https://img.logo.dev/radiozu.ro?token=t")
            .build("Radio ZU - Bucuresti");
        assert_eq!(
            line,
            r#"#EXTINF:-1 group-title="Romania" radio="true" tvg-logo="https://img.logo.dev/radiozu.ro?token=t",Radio ZU - Bucuresti"#
        );
    }

    #[test]
    fn neutralizes_quotes_and_newlines() {
        let line = ExtinfBuilder::new()
            .attribute("group-title", "The \"Best\"")
            .build("Two\nLines");
        assert_eq!(line, r#"#EXTINF:-1 group-title="The 'Best'",Two Lines"#);
    }
}
