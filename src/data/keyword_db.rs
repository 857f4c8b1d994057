//! The keyword database and keyword expansion.
//!
//! The database compiles the game's and the set's keywords into regexes
//! once, on first use, and is cleared whenever the keyword lists change.
//!
//! ## Expansion
//!
//! Expanded keywords are wrapped in `<kw-X>` tags, where `X` records how
//! the reminder text was chosen:
//!
//! | tag      | reminder                          |
//! |----------|-----------------------------------|
//! | `<kw-0>` | forced off by the user            |
//! | `<kw-1>` | forced on by the user             |
//! | `<kw-a>` | automatic, `default expand` said no |
//! | `<kw-A>` | automatic, expanded               |
//!
//! Re-expanding text keeps the `0`/`1` choices and regenerates the rest.

use std::rc::Rc;

use log::{debug, warn};
use regex::Regex;

use crate::core::{ScriptError, ScriptResult};
use crate::script::ast::Expr;
use crate::script::parser::parse_template;
use crate::script::{eval, Args, Context, Script, Value};
use crate::text::{match_close_tag, skip_tag};

use super::game::Game;
use super::keyword::{Keyword, KeywordParamType};

const PARAM_OPEN: &str = "<atom-param>";
const PARAM_CLOSE: &str = "</atom-param>";
const REMINDER_OPEN: &str = "<atom-reminder";
const KW_OPEN: &str = "<kw-";
const KW_CLOSE: &str = "</kw-";
const PARAM_TAG: &str = "<param-";
const PARAM_TAG_CLOSE: &str = "</param-";

#[derive(Debug)]
struct CompiledParam {
    type_name: String,
    reminder_script: Option<Script>,
}

/// A keyword ready for matching.
#[derive(Debug)]
pub struct CompiledKeyword {
    name: String,
    mode: String,
    regex: Regex,
    params: Vec<CompiledParam>,
    reminder: Option<Rc<Expr>>,
}

impl CompiledKeyword {
    /// Compile `keyword` against the available parameter types.
    pub fn compile(keyword: &Keyword, param_types: &[KeywordParamType]) -> ScriptResult<Self> {
        let text = keyword.effective_match();
        let mut pattern = String::new();
        let mut params = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find(PARAM_OPEN) {
            pattern.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + PARAM_OPEN.len()..];
            let close = after.find(PARAM_CLOSE).ok_or_else(|| {
                ScriptError::parse(format!("unterminated parameter in keyword '{}'", keyword.keyword))
            })?;
            let type_name = &after[..close];
            let param_type = param_types
                .iter()
                .find(|t| t.name == type_name)
                .ok_or_else(|| {
                    ScriptError::Usage(format!("unknown keyword parameter type '{type_name}'"))
                })?;
            params.push(CompiledParam {
                type_name: type_name.to_string(),
                reminder_script: param_type.reminder_script.clone(),
            });
            pattern.push_str(&format!("(?P<p{}>{})", params.len(), param_type.match_regex));
            rest = &after[close + PARAM_CLOSE.len()..];
        }
        pattern.push_str(&regex::escape(rest));

        if text.starts_with(|c: char| c.is_alphanumeric()) {
            pattern.insert_str(0, r"\b");
        }
        if rest.ends_with(|c: char| c.is_alphanumeric()) {
            pattern.push_str(r"\b");
        }
        let regex = Regex::new(&pattern)
            .map_err(|e| ScriptError::parse(format!("keyword '{}': {e}", keyword.keyword)))?;
        let reminder = if keyword.reminder.is_empty() {
            None
        } else {
            Some(Rc::new(parse_template(&keyword.reminder)?))
        };
        Ok(Self {
            name: keyword.keyword.clone(),
            mode: keyword.mode.clone(),
            regex,
            params,
            reminder,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Lazily built table of the keywords of a set and its game.
#[derive(Debug, Default)]
pub struct KeywordDatabase {
    built: bool,
    entries: Vec<Rc<CompiledKeyword>>,
}

impl KeywordDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Compile the game's keywords followed by `set_keywords`.
    ///
    /// Keywords that fail to compile are skipped with a warning.
    pub fn build<'a>(&mut self, game: &'a Game, set_keywords: impl IntoIterator<Item = &'a Keyword>) {
        self.entries.clear();
        for keyword in game.keywords.iter().chain(set_keywords) {
            match CompiledKeyword::compile(keyword, &game.keyword_parameter_types) {
                Ok(compiled) => self.entries.push(Rc::new(compiled)),
                Err(e) => warn!("skipping keyword '{}': {e}", keyword.keyword),
            }
        }
        self.built = true;
        debug!("built keyword database with {} keywords", self.entries.len());
    }

    /// Forget everything; the next use rebuilds.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.built = false;
    }

    #[must_use]
    pub fn entries(&self) -> &[Rc<CompiledKeyword>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A span of stripped text that was inside `<kw-X>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct KeywordSpan {
    start: usize,
    end: usize,
    flag: char,
}

/// Remove generated reminders, `<kw-X>` and `<param-T>` tags, remembering
/// the keyword spans.
fn strip_expansions(input: &str) -> (String, Vec<KeywordSpan>) {
    let mut out = String::with_capacity(input.len());
    let mut spans = Vec::new();
    let mut open: Vec<(usize, char)> = Vec::new();
    let mut pos = 0;
    while let Some(i) = input[pos..].find('<') {
        let at = pos + i;
        out.push_str(&input[pos..at]);
        let rest = &input[at..];
        if rest.starts_with(REMINDER_OPEN) {
            pos = match match_close_tag(input, at) {
                Some(end) => skip_tag(input, end),
                None => skip_tag(input, at),
            };
        } else if rest.starts_with(KW_OPEN) {
            let flag = rest[KW_OPEN.len()..].chars().next().unwrap_or('a');
            open.push((out.len(), flag));
            pos = skip_tag(input, at);
        } else if rest.starts_with(PARAM_TAG) || rest.starts_with(PARAM_TAG_CLOSE) {
            pos = skip_tag(input, at);
        } else if rest.starts_with(KW_CLOSE) {
            if let Some((start, flag)) = open.pop() {
                spans.push(KeywordSpan {
                    start,
                    end: out.len(),
                    flag,
                });
            }
            pos = skip_tag(input, at);
        } else {
            out.push('<');
            pos = at + 1;
        }
    }
    out.push_str(&input[pos..]);
    (out, spans)
}

/// The user's reminder choice for a match starting at `start`.
fn forced_at(spans: &[KeywordSpan], start: usize) -> Option<bool> {
    spans
        .iter()
        .find(|s| s.start <= start && start < s.end)
        .and_then(|s| match s.flag {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
}

/// One keyword occurrence found in the text.
struct Occurrence {
    entry: Rc<CompiledKeyword>,
    start: usize,
    end: usize,
    /// Parameter spans, in parameter order.
    params: Vec<Option<(usize, usize)>>,
}

/// Leftmost match at or after `pos`; the longest one on ties, then the
/// first declared.
fn next_occurrence(entries: &[Rc<CompiledKeyword>], text: &str, pos: usize) -> Option<Occurrence> {
    let mut best: Option<Occurrence> = None;
    for entry in entries {
        let Some(caps) = entry.regex.captures_at(text, pos) else {
            continue;
        };
        let Some(m) = caps.get(0) else { continue };
        if m.is_empty() {
            continue;
        }
        let better = match &best {
            None => true,
            Some(b) => m.start() < b.start || (m.start() == b.start && m.end() > b.end),
        };
        if better {
            let params = (1..=entry.params.len())
                .map(|i| caps.name(&format!("p{i}")).map(|p| (p.start(), p.end())))
                .collect();
            best = Some(Occurrence {
                entry: entry.clone(),
                start: m.start(),
                end: m.end(),
                params,
            });
        }
    }
    best
}

/// Expand every keyword occurrence in `input`.
///
/// `default_expand` decides, per keyword mode, whether the reminder of a
/// keyword the user has not forced is shown. `combine` builds the final
/// text from `keyword`, `reminder`, `expand` and `mode`.
pub fn expand_keywords(
    entries: &[Rc<CompiledKeyword>],
    input: &str,
    default_expand: Option<&Value>,
    combine: Option<&Value>,
    ctx: &mut Context,
) -> ScriptResult<String> {
    let (text, spans) = strip_expansions(input);
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(occ) = next_occurrence(entries, &text, pos) {
        out.push_str(&text[pos..occ.start]);
        out.push_str(&expand_occurrence(&occ, &text, &spans, default_expand, combine, ctx)?);
        pos = occ.end;
    }
    out.push_str(&text[pos..]);
    Ok(out)
}

fn expand_occurrence(
    occ: &Occurrence,
    text: &str,
    spans: &[KeywordSpan],
    default_expand: Option<&Value>,
    combine: Option<&Value>,
    ctx: &mut Context,
) -> ScriptResult<String> {
    let entry = &occ.entry;
    let mode = Value::string(&entry.mode);
    let forced = forced_at(spans, occ.start);
    let expand = match (forced, default_expand) {
        (Some(b), _) => b,
        (None, Some(f)) => ctx
            .call_value(f, Args::input(mode.clone()).with("mode", mode.clone()))?
            .to_bool()?,
        (None, None) => true,
    };

    // keyword text with its parameters tagged by type
    let mut keyword_text = String::new();
    let mut cursor = occ.start;
    let mut param_values = Vec::with_capacity(entry.params.len());
    for (param, span) in entry.params.iter().zip(&occ.params) {
        let Some((start, end)) = *span else {
            param_values.push(Value::Default);
            continue;
        };
        keyword_text.push_str(&text[cursor..start]);
        keyword_text.push_str(&format!(
            "<param-{0}>{1}</param-{0}>",
            param.type_name,
            &text[start..end]
        ));
        cursor = end;
        let raw = Value::string(&text[start..end]);
        let value = match &param.reminder_script {
            Some(script) => ctx.with_child_scope(|ctx| {
                ctx.set_variable("input", raw);
                eval(script.expr(), ctx)
            })?,
            None => raw,
        };
        param_values.push(value);
    }
    keyword_text.push_str(&text[cursor..occ.end]);

    let reminder = match &entry.reminder {
        Some(template) => ctx
            .with_child_scope(|ctx| {
                for (i, value) in param_values.into_iter().enumerate() {
                    ctx.set_variable(format!("param{}", i + 1), value);
                }
                ctx.set_variable("mode", mode.clone());
                eval(template, ctx)
            })?
            .to_string(),
        None => String::new(),
    };

    let body = match combine {
        Some(f) => ctx
            .call_value(
                f,
                Args::new()
                    .with("keyword", keyword_text)
                    .with("reminder", reminder)
                    .with("expand", expand)
                    .with("mode", mode),
            )?
            .to_string(),
        None if expand && !reminder.is_empty() => {
            format!("{keyword_text}<atom-reminder> ({reminder})</atom-reminder>")
        }
        None => keyword_text,
    };
    ctx.note_keyword_used(&entry.name);

    let flag = match forced {
        Some(false) => '0',
        Some(true) => '1',
        None if expand => 'A',
        None => 'a',
    };
    Ok(format!("<kw-{flag}>{body}</kw-{flag}>"))
}
