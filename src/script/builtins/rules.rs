//! Regex rules: `replace`, `filter` and their rule forms.
//!
//! Patterns are compiled when the rule is made, so a bad regex is reported
//! once, as a parse error, instead of on every use.

use regex::Regex;

use crate::core::{ScriptError, ScriptResult};
use crate::deps::Dependency;
use crate::script::{rule_value, Args, Builtin, Context, ScriptFunction, Value, INPUT};

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin::new("replace", replace),
    Builtin::new("filter", filter),
    Builtin::new("replace rule", replace_rule),
    Builtin::new("filter rule", filter_rule),
];

fn compile(pattern: &str) -> ScriptResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        ScriptError::parse(format!("error while compiling regular expression '{pattern}': {e}"))
    })
}

/// Translate a literal replacement to `regex` syntax: `\1` and `&` refer
/// to groups, `$` is literal.
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('$') => out.push_str("$$"),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '&' => out.push_str("${0}"),
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out
}

enum Replacement {
    Literal(String),
    Function(Value),
}

/// A compiled `replace rule`.
pub struct ReplaceRule {
    regex: Regex,
    context: Option<Regex>,
    replacement: Replacement,
}

impl ReplaceRule {
    /// Build from the `match`, `replace` and `in context` arguments.
    pub fn from_args(args: &Args) -> ScriptResult<Self> {
        let regex = compile(&args.string("match")?)?;
        let replacement = match args.get("replace")? {
            f @ Value::Function(_) => Replacement::Function(f),
            other => Replacement::Literal(translate_replacement(&other.to_string())),
        };
        let context = match args.opt("in context") {
            Some(c) => Some(compile(&c.to_string())?),
            None => None,
        };
        Ok(Self {
            regex,
            context,
            replacement,
        })
    }

    fn apply(&self, input: &str, ctx: &mut Context) -> ScriptResult<String> {
        if self.context.is_none() {
            if let Replacement::Literal(r) = &self.replacement {
                return Ok(self.regex.replace_all(input, r.as_str()).into_owned());
            }
        }
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(caps) = self.regex.captures(rest) {
            let Some(whole) = caps.get(0) else { break };
            out.push_str(&rest[..whole.start()]);
            let next = &rest[whole.end()..];
            let in_context = match &self.context {
                Some(context) => context.is_match(&format!("{out}<match>{next}")),
                None => true,
            };
            if in_context {
                match &self.replacement {
                    Replacement::Function(f) => {
                        let mut call = Args::input(whole.as_str());
                        for i in 1..caps.len() {
                            let group = caps.get(i).map_or("", |m| m.as_str());
                            call.set(format!("_{i}"), Value::from(group));
                        }
                        out.push_str(&ctx.call_value(f, call)?.to_string());
                    }
                    Replacement::Literal(r) => caps.expand(r, &mut out),
                }
            } else {
                out.push_str(whole.as_str());
            }
            if whole.is_empty() {
                // step over one character so an empty match cannot loop
                let Some(c) = next.chars().next() else {
                    rest = next;
                    break;
                };
                out.push(c);
                rest = &next[c.len_utf8()..];
            } else {
                rest = next;
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl ScriptFunction for ReplaceRule {
    fn name(&self) -> &str {
        "replace rule"
    }

    fn call(&self, ctx: &mut Context, args: Args) -> ScriptResult<Value> {
        let input = args.string(INPUT)?;
        Ok(Value::from(self.apply(&input, ctx)?))
    }

    fn dependencies(&self, ctx: &mut Context, dep: &Dependency) -> ScriptResult<()> {
        match &self.replacement {
            Replacement::Function(Value::Function(f)) => f.dependencies(ctx, dep),
            _ => Ok(()),
        }
    }
}

/// A compiled `filter rule`: keeps only the matches.
pub struct FilterRule {
    regex: Regex,
}

impl FilterRule {
    pub fn from_args(args: &Args) -> ScriptResult<Self> {
        Ok(Self {
            regex: compile(&args.string("match")?)?,
        })
    }

    fn apply(&self, input: &str) -> String {
        self.regex.find_iter(input).map(|m| m.as_str()).collect()
    }
}

impl ScriptFunction for FilterRule {
    fn name(&self) -> &str {
        "filter rule"
    }

    fn call(&self, _: &mut Context, args: Args) -> ScriptResult<Value> {
        Ok(Value::from(self.apply(&args.string(INPUT)?)))
    }
}

fn replace(ctx: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    Ok(Value::from(ReplaceRule::from_args(args)?.apply(&input, ctx)?))
}

fn replace_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(rule_value(ReplaceRule::from_args(args)?))
}

fn filter(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    let input = args.string(INPUT)?;
    Ok(Value::from(FilterRule::from_args(args)?.apply(&input)))
}

fn filter_rule(_: &mut Context, args: &Args) -> ScriptResult<Value> {
    Ok(rule_value(FilterRule::from_args(args)?))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{eval, eval_str};
    use super::*;

    #[test]
    fn test_translate_replacement() {
        assert_eq!(translate_replacement(r"\1-&"), "${1}-${0}");
        assert_eq!(translate_replacement("$5"), "$$5");
    }

    #[test]
    fn test_literal_replace() {
        assert_eq!(eval_str(r#"replace("a-b-c", match: "-", replace: "+")"#), "a+b+c");
        assert_eq!(
            eval_str(r#"replace("cost 3", match: "([0-9])", replace: "<\1>")"#),
            "cost <3>"
        );
    }

    #[test]
    fn test_function_replace_sees_groups() {
        assert_eq!(
            eval_str(r#"replace("a1b2", match: "([a-z])([0-9])", replace: { _2 + _1 })"#),
            "1a2b"
        );
        assert_eq!(
            eval_str(r#"replace("ab", match: "b", replace: { to_upper(input) })"#),
            "aB"
        );
    }

    #[test]
    fn test_context_limits_replacement() {
        // only replace 'x' directly before a '!'
        assert_eq!(
            eval_str(r#"replace("x x!", match: "x", in_context: "<match>!", replace: "y")"#),
            "x y!"
        );
        // context never matches: input unchanged
        assert_eq!(
            eval_str(r#"replace("x x", match: "x", in_context: "^z<match>", replace: "y")"#),
            "x x"
        );
    }

    #[test]
    fn test_filter() {
        assert_eq!(eval_str(r#"filter("a1b22c", match: "[0-9]+")"#), "122");
        assert_eq!(eval_str(r#"filter("abc", match: "[0-9]")"#), "");
        assert_eq!(eval_str(r#"f := filter_rule(match: "aa"); f("aaaaa")"#), "aaaa");
    }

    #[test]
    fn test_bad_regex_fails_at_construction() {
        assert!(matches!(
            eval(r#"replace_rule(match: "(", replace: "")"#),
            Err(ScriptError::Parse { .. })
        ));
        assert!(matches!(
            eval(r#"filter_rule(match: "[")"#),
            Err(ScriptError::Parse { .. })
        ));
    }

    #[test]
    fn test_rule_is_reusable() {
        assert_eq!(
            eval_str(
                r#"r := replace_rule(match: "o", replace: "0")
                   r("foo") + r("bob")"#
            ),
            "f00b0b"
        );
    }
}
