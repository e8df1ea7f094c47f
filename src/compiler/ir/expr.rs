use std::fmt::Display;

use crate::compiler::stringtable::{StringId, StringTable};

/**
An opaque C expression attached to an annotation: a size formula, a `when`
guard, a check invariant or an implicit-pointer location.

The expression is never parsed or evaluated here.  The raw text is kept as
written (after macro substitution), and [`CExpr::analyze`] derives the two
things the semantic passes need from it: the list of free variable names
(each identifier followed by a `.`), and the rendered text where the
`$name.` shorthand is rewritten to `name.get_location().` for the code
generator.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct CExpr {
    raw: String,
    text: String,
    vars: Vec<StringId>,
}

impl CExpr {
    pub fn new(raw: &str) -> CExpr {
        let raw = raw.trim().to_string();
        CExpr {
            text: raw.clone(),
            raw,
            vars: Vec::new(),
        }
    }

    /// The expression text as written, after any macro substitution.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The rendered text; identical to `raw` until [`CExpr::analyze`] runs.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Free variable names, in first-mention order, without duplicates.
    pub fn vars(&self) -> &[StringId] {
        &self.vars
    }

    pub fn is_constant(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn mentions(&self, var: StringId) -> bool {
        self.vars.contains(&var)
    }

    /// Replaces every whole-word occurrence of the macro `name` with the
    /// parenthesized macro `body`.
    pub fn substitute(&mut self, name: &str, body: &str) {
        self.rewrite_word(name, &format!("({})", body));
    }

    /// Whole-word replacement without parenthesizing.  Returns true when
    /// the expression changed.
    pub fn rewrite_word(&mut self, word: &str, replacement: &str) -> bool {
        let rewritten = substitute_word(&self.raw, word, replacement);
        let changed = rewritten != self.raw;
        if changed {
            self.raw = rewritten;
            self.text = self.raw.clone();
        }
        changed
    }

    /// Extracts the free variables of the expression and applies the
    /// `$name.` to `name.get_location().` rewrite.  A free variable is any
    /// identifier immediately followed by `.`, with or without the `$`
    /// prefix.
    pub fn analyze(&mut self, st: &StringTable) {
        let chars: Vec<char> = self.raw.chars().collect();
        let mut text = String::with_capacity(self.raw.len());
        let mut vars: Vec<StringId> = Vec::new();

        let mut i = 0;
        while i < chars.len() {
            let dollar = chars[i] == '$';
            let start = if dollar { i + 1 } else { i };
            let at_ident = start < chars.len()
                && (chars[start].is_ascii_alphabetic() || chars[start] == '_')
                && (i == 0 || !is_word(chars[i - 1]));
            if !at_ident {
                text.push(chars[i]);
                i += 1;
                continue;
            }

            let mut end = start;
            while end < chars.len() && is_word(chars[end]) {
                end += 1;
            }
            let ident: String = chars[start..end].iter().collect();
            let followed_by_dot = end < chars.len() && chars[end] == '.';

            if followed_by_dot {
                let id = st.insert(ident.clone());
                if !vars.contains(&id) {
                    vars.push(id);
                }
            }
            text.push_str(&ident);
            if dollar && followed_by_dot {
                text.push_str(".get_location()");
            }
            i = end;
        }

        self.text = text;
        self.vars = vars;
    }
}

impl Display for CExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whole-word replacement: `word` is only replaced where neither the
/// preceding nor the following character is an identifier character.
fn substitute_word(text: &str, word: &str, replacement: &str) -> String {
    if word.is_empty() {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let wchars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let end = i + wchars.len();
        let hit = end <= chars.len()
            && chars[i..end] == wchars[..]
            && (i == 0 || !is_word(chars[i - 1]))
            && (end == chars.len() || !is_word(chars[end]));
        if hit {
            out.push_str(replacement);
            i = end;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_respects_word_boundaries() {
        let mut e = CExpr::new("BLOCK_SIZE + BLOCK");
        e.substitute("BLOCK", "512");
        assert_eq!(e.raw(), "BLOCK_SIZE + (512)");
    }

    #[test]
    fn substitution_parenthesizes_the_body() {
        let mut e = CExpr::new("2 * HALF");
        e.substitute("HALF", "n / 2");
        assert_eq!(e.raw(), "2 * (n / 2)");
    }

    #[test]
    fn analyze_extracts_dotted_identifiers() {
        let st = StringTable::new();
        let mut e = CExpr::new("sb.block_size * grp.count + 4");
        e.analyze(&st);
        let sb = st.insert("sb".into());
        let grp = st.insert("grp".into());
        assert_eq!(e.vars(), &[sb, grp]);
        assert_eq!(e.text(), "sb.block_size * grp.count + 4");
    }

    #[test]
    fn analyze_deduplicates_variables() {
        let st = StringTable::new();
        let mut e = CExpr::new("sb.a + sb.b");
        e.analyze(&st);
        assert_eq!(e.vars().len(), 1);
    }

    #[test]
    fn dollar_prefix_becomes_location_call() {
        let st = StringTable::new();
        let mut e = CExpr::new("$sb.block_size");
        e.analyze(&st);
        assert_eq!(e.text(), "sb.get_location().block_size");
        assert!(e.mentions(st.insert("sb".into())));
    }

    #[test]
    fn plain_identifiers_are_not_variables() {
        let st = StringTable::new();
        let mut e = CExpr::new("count * 8");
        e.analyze(&st);
        assert!(e.is_constant());
        assert_eq!(e.text(), "count * 8");
    }
}
