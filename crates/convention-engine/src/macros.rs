use regex::Regex;

/// A find/replace rule applied to descriptions.
///
/// The pattern is a regular expression; the replacement may refer to its
/// capture groups (`$1`, `${1}`, `${name}`). Any other `$` in the
/// replacement is literal text, so a replacement can mention another macro
/// (`15-17 $hcp`) or a depth placeholder. Two macros are the same rule when
/// pattern and replacement text are equal.
#[derive(Debug, Clone)]
pub struct Macro {
    pattern: String,
    replacement: String,
    regex: Regex,
    // `replacement` rewritten for `Regex::replace_all`.
    template: String,
}

impl Macro {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let template = expansion_template(replacement, &regex);
        Ok(Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            regex,
            template,
        })
    }

    /// A rule matching `find` verbatim and inserting `replacement` verbatim.
    pub fn literal(find: &str, replacement: &str) -> Self {
        let pattern = regex::escape(find);
        // An escaped string always compiles.
        let regex = Regex::new(&pattern).expect("escaped literal is a valid pattern");
        Self {
            pattern,
            replacement: replacement.to_string(),
            regex,
            template: replacement.replace('$', "$$"),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn apply(&self, text: &str) -> String {
        self.regex
            .replace_all(text, self.template.as_str())
            .into_owned()
    }
}

/// Keeps `$n`, `${n}` and `${name}` where the group exists in `regex`
/// (rewritten to the braced form) and escapes every other `$`.
fn expansion_template(replacement: &str, regex: &Regex) -> String {
    let mut template = String::with_capacity(replacement.len());
    let mut rest = replacement;
    while let Some(dollar) = rest.find('$') {
        template.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let (name, consumed) = match after.strip_prefix('{').and_then(|inner| inner.find('}')) {
            Some(close) => (&after[1..close + 1], close + 2),
            None => {
                let digits = after.bytes().take_while(u8::is_ascii_digit).count();
                (&after[..digits], digits)
            }
        };
        if !name.is_empty() && names_group(regex, name) {
            template.push_str("${");
            template.push_str(name);
            template.push('}');
            rest = &after[consumed..];
        } else {
            template.push_str("$$");
            rest = after;
        }
    }
    template.push_str(rest);
    template
}

fn names_group(regex: &Regex, name: &str) -> bool {
    match name.parse::<usize>() {
        Ok(index) => index < regex.captures_len(),
        Err(_) => regex.capture_names().flatten().any(|group| group == name),
    }
}

impl PartialEq for Macro {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.replacement == other.replacement
    }
}

impl Eq for Macro {}

/// The ordered macro rules declared on one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    rules: Vec<Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Macro) {
        self.rules.push(rule);
    }

    /// Appends `rule` unless an equal rule is already present. Returns
    /// whether it was added.
    pub fn push_unique(&mut self, rule: Macro) -> bool {
        if self.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    pub fn extend_unique<'a>(&mut self, rules: impl IntoIterator<Item = &'a Macro>) {
        for rule in rules {
            self.push_unique(rule.clone());
        }
    }

    pub fn contains(&self, rule: &Macro) -> bool {
        self.rules.contains(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over `text` once, in declaration order.
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc))
    }
}

impl FromIterator<Macro> for MacroTable {
    fn from_iter<I: IntoIterator<Item = Macro>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MacroTable {
    type Item = &'a Macro;
    type IntoIter = std::slice::Iter<'a, Macro>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
