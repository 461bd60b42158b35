//! Turtle / triple-pattern grammar
//!
//! Terminal parsers are nom combinators; statement structure is hand-rolled
//! recursive descent. The engine does not build triples itself: it emits
//! [`Event`]s to a [`TripleBuilder`], which owns all construction state.
//! `@prefix`/`@base` (and SPARQL-style `PREFIX`/`BASE`) directives mutate the
//! prefix registry as a side effect and produce no output.

pub(crate) mod scan;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::builder::{Event, TripleBuilder, TripleSink};
use crate::error::{Result, TurtleError};
use crate::ns;
use crate::prefixes::PrefixRegistry;
use crate::term::Term;

/// Which grammar the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Full Turtle documents: directives, bound terms only.
    Turtle,
    /// SPARQL WHERE-clause triple blocks: variables allowed, no directives,
    /// the final `.` may be omitted.
    TriplesBlock,
}

/// Parse whitespace and comments.
fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), preceded(char('#'), take_while(|c| c != '\n'))),
        ))),
    )(input)
}

fn skip_ws(input: &str) -> &str {
    match ws(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

/// Parse an IRI reference `<...>`.
fn iri_ref(input: &str) -> IResult<&str, &str> {
    delimited(
        char('<'),
        take_while(|c| c != '>' && c != ' ' && c != '\n' && c != '\r'),
        char('>'),
    )(input)
}

fn is_pn_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Parse a prefixed name `prefix:local`. Local names may contain dots but
/// never end with one; trailing dots stay in the input as the statement
/// terminator.
fn prefixed_name(input: &str) -> IResult<&str, (&str, &str)> {
    let prefix_end = input
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    let after_prefix = &input[prefix_end..];
    if !after_prefix.starts_with(':') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let local_input = &after_prefix[1..];
    let mut local_end = local_input
        .find(|c: char| !is_pn_char(c))
        .unwrap_or(local_input.len());
    while local_end > 0 && local_input[..local_end].ends_with('.') {
        local_end -= 1;
    }
    Ok((
        &local_input[local_end..],
        (&input[..prefix_end], &local_input[..local_end]),
    ))
}

/// Parse a string literal with escape sequences.
fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        map(
            delimited(tag("\"\"\""), take_until("\"\"\""), tag("\"\"\"")),
            unescape_string,
        ),
        map(
            delimited(tag("'''"), take_until("'''"), tag("'''")),
            unescape_string,
        ),
        map(
            delimited(
                char('"'),
                recognize(many0(alt((
                    take_while1(|c| c != '"' && c != '\\' && c != '\n'),
                    recognize(pair(char('\\'), nom::character::complete::anychar)),
                )))),
                char('"'),
            ),
            unescape_string,
        ),
        map(
            delimited(
                char('\''),
                recognize(many0(alt((
                    take_while1(|c| c != '\'' && c != '\\' && c != '\n'),
                    recognize(pair(char('\\'), nom::character::complete::anychar)),
                )))),
                char('\''),
            ),
            unescape_string,
        ),
    ))(input)
}

/// Unescape `\n`, `\t`, quote escapes and `\uXXXX`/`\UXXXXXXXX`.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some(u @ ('u' | 'U')) => {
                let width = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => result.push(decoded),
                    None => {
                        result.push('\\');
                        result.push(u);
                        result.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Parse a variable `?name`.
fn variable_name(input: &str) -> IResult<&str, &str> {
    preceded(
        char('?'),
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
    )(input)
}

/// Parse a blank node label `_:label`.
fn blank_node_label(input: &str) -> IResult<&str, &str> {
    preceded(
        tag("_:"),
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    )(input)
}

/// Parse a numeric literal shorthand into its canonical quoted form. The
/// original lexical digits are preserved verbatim; only the datatype is
/// inferred: exponent present means `xsd:double`, a fraction means
/// `xsd:decimal`, otherwise `xsd:integer`.
fn numeric_literal(input: &str) -> IResult<&str, Term> {
    let (rest, sign) = opt(alt((char('+'), char('-'))))(input)?;
    // the integer part may be empty when a fraction follows, as in `.5`
    let (rest, digits) = opt(digit1)(rest)?;
    let (rest, fraction) = opt(pair(char('.'), digit1))(rest)?;
    if digits.is_none() && fraction.is_none() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    }
    let (rest, exponent) = opt(tuple((
        alt((char('e'), char('E'))),
        opt(alt((char('+'), char('-')))),
        digit1,
    )))(rest)?;

    let mut lexical = String::new();
    if let Some(sign) = sign {
        lexical.push(sign);
    }
    if let Some(digits) = digits {
        lexical.push_str(digits);
    }
    if let Some((_, frac)) = fraction {
        lexical.push('.');
        lexical.push_str(frac);
    }
    let datatype = if let Some((e, exp_sign, exp_digits)) = exponent {
        lexical.push(e);
        if let Some(s) = exp_sign {
            lexical.push(s);
        }
        lexical.push_str(exp_digits);
        ns::XSD_DOUBLE
    } else if fraction.is_some() {
        ns::XSD_DECIMAL
    } else {
        ns::XSD_INTEGER
    };

    Ok((rest, Term::typed_literal(lexical, datatype)))
}

/// Parse `true` / `false` followed by a token boundary.
fn boolean_literal(input: &str) -> IResult<&str, Term> {
    for keyword in ["true", "false"] {
        if let Some(rest) = input.strip_prefix(keyword) {
            let bounded = match rest.chars().next() {
                None => true,
                Some(c) => !is_pn_char(c) && c != ':',
            };
            if bounded {
                return Ok((rest, Term::typed_literal(keyword, ns::XSD_BOOLEAN)));
            }
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Tag,
    )))
}

/// Is `keyword` at the head of the input followed by whitespace? Guards the
/// SPARQL-style directives against subjects like `PREFIXED:x`.
fn is_directive_keyword(input: &str, keyword: &str) -> bool {
    input
        .strip_prefix(keyword)
        .and_then(|rest| rest.chars().next())
        .map_or(false, char::is_whitespace)
}

/// Does `a` at the head of the input stand alone as the rdf:type shorthand?
fn is_rdf_type_shorthand(input: &str) -> bool {
    match input.strip_prefix('a') {
        Some(rest) => matches!(
            rest.chars().next(),
            Some(c) if c.is_whitespace() || matches!(c, '<' | '?' | '[' | '(' | '"' | '\'' | '#')
        ),
        None => false,
    }
}

/// Byte-offset bookkeeping for one fed chunk.
struct Cursor<'a> {
    chunk: &'a str,
    base: usize,
}

impl<'a> Cursor<'a> {
    fn at(&self, rest: &str) -> usize {
        self.base + (self.chunk.len() - rest.len())
    }
}

/// Statement-level grammar engine. Recognises productions in the fed text
/// and reports them to the triple builder as events.
pub struct GrammarEngine<S: TripleSink> {
    prefixes: PrefixRegistry,
    builder: TripleBuilder<S>,
    mode: ParseMode,
    offset: usize,
}

impl<S: TripleSink> GrammarEngine<S> {
    pub fn new(sink: S, mode: ParseMode, prefixes: PrefixRegistry) -> Self {
        GrammarEngine {
            prefixes,
            builder: TripleBuilder::new(sink),
            mode,
            offset: 0,
        }
    }

    /// Parse a whole document on the calling thread.
    pub fn parse_document(&mut self, input: &str) -> Result<()> {
        self.feed(input)?;
        self.finish()
    }

    /// Parse every complete statement in `chunk`. Streaming callers hand
    /// over whole statements only (see [`scan::statement_end`]); offsets
    /// accumulate across calls.
    pub fn feed(&mut self, chunk: &str) -> Result<()> {
        let cursor = Cursor { chunk, base: self.offset };
        let mut rest = skip_ws(chunk);
        while !rest.is_empty() {
            rest = self.parse_statement(&cursor, rest)?;
            rest = skip_ws(rest);
        }
        self.offset += chunk.len();
        Ok(())
    }

    /// Signal end of input.
    pub fn finish(&mut self) -> Result<()> {
        self.builder.handle(Event::DocumentComplete)
    }

    pub fn into_sink(self) -> S {
        self.builder.into_sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.builder.sink_mut()
    }

    fn grammar_err(&self, cursor: &Cursor<'_>, rest: &str, message: impl Into<String>) -> TurtleError {
        TurtleError::grammar(cursor.at(rest), message)
    }

    fn parse_statement<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<&'a str> {
        if self.mode == ParseMode::Turtle {
            if input.starts_with('@') {
                return self.parse_directive(cursor, input);
            }
            if is_directive_keyword(input, "PREFIX") || is_directive_keyword(input, "BASE") {
                return self.parse_sparql_directive(cursor, input);
            }
        }
        self.parse_triples(cursor, input)
    }

    /// Parse `@prefix p: <ns> .` or `@base <iri> .`.
    fn parse_directive<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<&'a str> {
        if let Some(rest) = input.strip_prefix("@prefix") {
            let rest = skip_ws(rest);
            let (rest, prefix) =
                take_while::<_, _, nom::error::Error<&str>>(|c: char| c.is_alphanumeric() || c == '_')(rest)
                    .map_err(|_| self.grammar_err(cursor, rest, "expected prefix label"))?;
            let rest = rest
                .strip_prefix(':')
                .ok_or_else(|| self.grammar_err(cursor, rest, "expected ':' after prefix label"))?;
            let rest = skip_ws(rest);
            let (rest, namespace) = iri_ref(rest)
                .map_err(|_| self.grammar_err(cursor, rest, "expected IRI for namespace"))?;
            let rest = skip_ws(rest);
            let rest = rest
                .strip_prefix('.')
                .ok_or_else(|| self.grammar_err(cursor, rest, "expected '.' after @prefix directive"))?;
            self.prefixes.add_prefix(prefix, namespace);
            Ok(rest)
        } else if let Some(rest) = input.strip_prefix("@base") {
            let rest = skip_ws(rest);
            let (rest, base) = iri_ref(rest)
                .map_err(|_| self.grammar_err(cursor, rest, "expected IRI for base"))?;
            let rest = skip_ws(rest);
            let rest = rest
                .strip_prefix('.')
                .ok_or_else(|| self.grammar_err(cursor, rest, "expected '.' after @base directive"))?;
            self.prefixes.set_base(base);
            Ok(rest)
        } else {
            Err(self.grammar_err(cursor, input, "unknown directive"))
        }
    }

    /// Parse SPARQL-style `PREFIX`/`BASE` (no trailing dot).
    fn parse_sparql_directive<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<&'a str> {
        if let Some(rest) = input.strip_prefix("PREFIX") {
            let rest = skip_ws(rest);
            let (rest, prefix) =
                take_while::<_, _, nom::error::Error<&str>>(|c: char| c.is_alphanumeric() || c == '_')(rest)
                    .map_err(|_| self.grammar_err(cursor, rest, "expected prefix label"))?;
            let rest = rest
                .strip_prefix(':')
                .ok_or_else(|| self.grammar_err(cursor, rest, "expected ':' after prefix label"))?;
            let rest = skip_ws(rest);
            let (rest, namespace) = iri_ref(rest)
                .map_err(|_| self.grammar_err(cursor, rest, "expected IRI for namespace"))?;
            self.prefixes.add_prefix(prefix, namespace);
            Ok(rest)
        } else if let Some(rest) = input.strip_prefix("BASE") {
            let rest = skip_ws(rest);
            let (rest, base) = iri_ref(rest)
                .map_err(|_| self.grammar_err(cursor, rest, "expected IRI for base"))?;
            self.prefixes.set_base(base);
            Ok(rest)
        } else {
            Err(self.grammar_err(cursor, input, "unknown directive"))
        }
    }

    /// Parse one triples statement and close it.
    fn parse_triples<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<&'a str> {
        let rest = if input.starts_with('[') {
            // A leading unlabeled property list becomes the statement
            // subject; a further predicate-object list is optional.
            let rest = self.parse_property_list(cursor, input)?;
            let node = self.builder.take_element()?;
            self.builder.handle(Event::SubjectParsed(node))?;
            let rest = skip_ws(rest);
            if rest.starts_with('.') || rest.is_empty() {
                rest
            } else {
                self.parse_predicate_object_list(cursor, rest)?
            }
        } else {
            let (rest, subject) = self.parse_term(cursor, input)?;
            if subject.is_literal() {
                return Err(self.grammar_err(cursor, input, "literal cannot be used as subject"));
            }
            self.builder.handle(Event::SubjectParsed(subject))?;
            let rest = skip_ws(rest);
            self.parse_predicate_object_list(cursor, rest)?
        };

        let rest = skip_ws(rest);
        if let Some(rest) = rest.strip_prefix('.') {
            self.builder.handle(Event::TripleStatementClosed)?;
            Ok(rest)
        } else if self.mode == ParseMode::TriplesBlock && rest.is_empty() {
            // the last pattern of a block may omit its dot
            self.builder.handle(Event::TripleStatementClosed)?;
            Ok(rest)
        } else {
            Err(self.grammar_err(cursor, rest, "expected '.' at end of statement"))
        }
    }

    /// Parse a predicate-object list: `verb objectList (';' verb objectList)*`.
    fn parse_predicate_object_list<'a>(
        &mut self,
        cursor: &Cursor<'a>,
        input: &'a str,
    ) -> Result<&'a str> {
        let mut remaining = input;
        loop {
            let (rest, verb) = self.parse_verb(cursor, remaining)?;
            self.builder.handle(Event::VerbParsed(verb))?;
            let mut rest = skip_ws(rest);

            // object list on ','
            loop {
                let (after_object, object) = self.parse_term(cursor, rest)?;
                self.builder.handle(Event::ObjectParsed(object))?;
                self.builder.handle(Event::PredicateObjectPairClosed)?;
                let after_object = skip_ws(after_object);
                match after_object.strip_prefix(',') {
                    Some(next) => rest = skip_ws(next),
                    None => {
                        rest = after_object;
                        break;
                    }
                }
            }

            match rest.strip_prefix(';') {
                Some(next) => {
                    let mut next = skip_ws(next);
                    // each ';' introduces an optional group, so runs of
                    // semicolons and a trailing one are all valid
                    while let Some(more) = next.strip_prefix(';') {
                        next = skip_ws(more);
                    }
                    if next.starts_with('.') || next.starts_with(']') || next.is_empty() {
                        return Ok(next);
                    }
                    remaining = next;
                }
                None => return Ok(rest),
            }
        }
    }

    /// Parse a verb: the `a` shorthand or a term valid in predicate position.
    fn parse_verb<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<(&'a str, Term)> {
        if is_rdf_type_shorthand(input) {
            return Ok((&input[1..], Term::iri(ns::RDF_TYPE)));
        }
        let (rest, term) = self.parse_term(cursor, input)?;
        if term.is_iri() || (self.mode == ParseMode::TriplesBlock && term.is_variable()) {
            Ok((rest, term))
        } else {
            Err(self.grammar_err(cursor, input, "expected IRI in predicate position"))
        }
    }

    /// Parse any term, including nested collections and property lists
    /// (whose events are emitted along the way; the synthesised node is
    /// returned as the term).
    fn parse_term<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<(&'a str, Term)> {
        if input.starts_with('<') {
            let (rest, uri) = iri_ref(input)
                .map_err(|_| TurtleError::lexical(cursor.at(input), "malformed IRI reference"))?;
            let resolved = self.prefixes.resolve_relative(uri);
            return Ok((rest, Term::iri(resolved)));
        }

        if input.starts_with('?') {
            if self.mode != ParseMode::TriplesBlock {
                return Err(self.grammar_err(
                    cursor,
                    input,
                    "variables are only valid in triple-pattern mode",
                ));
            }
            let (rest, name) = variable_name(input)
                .map_err(|_| TurtleError::lexical(cursor.at(input), "malformed variable name"))?;
            return Ok((rest, Term::variable(name, false)));
        }

        if input.starts_with("_:") {
            let (rest, label) = blank_node_label(input)
                .map_err(|_| TurtleError::lexical(cursor.at(input), "malformed blank node label"))?;
            return Ok((rest, Term::blank(label)));
        }

        if input.starts_with('[') {
            let rest = self.parse_property_list(cursor, input)?;
            return Ok((rest, self.builder.take_element()?));
        }

        if input.starts_with('(') {
            let rest = self.parse_collection(cursor, input)?;
            return Ok((rest, self.builder.take_element()?));
        }

        if input.starts_with('"') || input.starts_with('\'') {
            return self.parse_literal(cursor, input);
        }

        if input.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
            if let Ok((rest, term)) = numeric_literal(input) {
                return Ok((rest, term));
            }
            return Err(TurtleError::lexical(cursor.at(input), "malformed numeric literal"));
        }

        if let Ok((rest, term)) = boolean_literal(input) {
            return Ok((rest, term));
        }

        if let Ok((rest, (prefix, local))) = prefixed_name(input) {
            let uri = self.prefixes.resolve(prefix, local)?;
            return Ok((rest, Term::iri(uri)));
        }

        let head = &input[..input.len().min(20)];
        Err(self.grammar_err(cursor, input, format!("cannot parse term starting with {:?}", head)))
    }

    /// Parse a quoted literal with optional `@lang` or `^^datatype`.
    fn parse_literal<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<(&'a str, Term)> {
        let (rest, lexical) = string_literal(input)
            .map_err(|_| TurtleError::lexical(cursor.at(input), "malformed string literal"))?;

        if let Some(after_at) = rest.strip_prefix('@') {
            let (rest, lang) =
                take_while1::<_, _, nom::error::Error<&str>>(|c: char| c.is_alphanumeric() || c == '-')(
                    after_at,
                )
                .map_err(|_| TurtleError::lexical(cursor.at(after_at), "malformed language tag"))?;
            // a datatype after a language tag is rejected, never resolved
            if rest.starts_with("^^") {
                return Err(TurtleError::LanguageAndDatatype);
            }
            return Ok((rest, Term::lang_literal(lexical, lang)));
        }

        if let Some(after_carets) = rest.strip_prefix("^^") {
            if let Ok((rest, datatype)) = iri_ref(after_carets) {
                let resolved = self.prefixes.resolve_relative(datatype);
                return Ok((rest, Term::typed_literal(lexical, resolved)));
            }
            if let Ok((rest, (prefix, local))) = prefixed_name(after_carets) {
                let uri = self.prefixes.resolve(prefix, local)?;
                return Ok((rest, Term::typed_literal(lexical, uri)));
            }
            return Err(self.grammar_err(cursor, after_carets, "expected datatype IRI after '^^'"));
        }

        Ok((rest, Term::plain_literal(lexical)))
    }

    /// Parse `[ predicateObjectList? ]`, emitting open/close events.
    fn parse_property_list<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<&'a str> {
        let rest = input
            .strip_prefix('[')
            .ok_or_else(|| self.grammar_err(cursor, input, "expected '['"))?;
        self.builder.handle(Event::BnodePropertyListOpen)?;
        let rest = skip_ws(rest);

        if let Some(rest) = rest.strip_prefix(']') {
            self.builder.handle(Event::BnodePropertyListClose)?;
            return Ok(rest);
        }

        let rest = self.parse_predicate_object_list(cursor, rest)?;
        let rest = skip_ws(rest);
        let rest = rest
            .strip_prefix(']')
            .ok_or_else(|| self.grammar_err(cursor, rest, "expected ']'"))?;
        self.builder.handle(Event::BnodePropertyListClose)?;
        Ok(rest)
    }

    /// Parse `( object* )`, emitting open, per-item and close events.
    fn parse_collection<'a>(&mut self, cursor: &Cursor<'a>, input: &'a str) -> Result<&'a str> {
        let mut rest = input
            .strip_prefix('(')
            .ok_or_else(|| self.grammar_err(cursor, input, "expected '('"))?;
        self.builder.handle(Event::CollectionOpen)?;

        loop {
            rest = skip_ws(rest);
            if let Some(rest) = rest.strip_prefix(')') {
                self.builder.handle(Event::CollectionClose)?;
                return Ok(rest);
            }
            if rest.is_empty() {
                return Err(self.grammar_err(cursor, rest, "expected ')'"));
            }
            let (after_item, item) = self.parse_term(cursor, rest)?;
            self.builder.handle(Event::ObjectParsed(item))?;
            rest = after_item;
        }
    }
}
