//! LaTeX to presentation MathML.
//!
//! The transliterator scans the expression left to right. At each command it
//! consults [`STRUCTURE_RULES`], an ordered table of constructs that take
//! arguments (fractions, roots, text, accents); the first rule whose arguments
//! parse wins and its operands are transliterated recursively. Script markers
//! attach to the atom before them. Whatever is left falls through to symbol
//! lookup and finally to digit, letter and operator wrapping.
//!
//! Commands without a rule are emitted as identifiers and reported as
//! `undefined_command`; they are never dropped.

use crate::align::{collapse_line_breaks, split_rows};
use crate::delimiters::strip_display_delimiters;
use crate::diagnostic::{Diagnostic, DiagnosticCategory};
use crate::mathml::tree::{escape_attribute, escape_text};
use crate::mathml::MATHML_NS;
use crate::placeholder::PlaceholderMap;
use mathboard_syntax::{argument_span, environment_end, group_end};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// MathML produced from one LaTeX expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transliteration {
    pub mathml: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Transliteration {
    /// Returns true if every construct had a rule.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Transliterates a LaTeX expression into a complete `<math>` element.
///
/// ```
/// use mathboard_core::transliterate::latex_to_mathml;
///
/// let out = latex_to_mathml(r"\[\frac{1}{2}\]");
/// assert_eq!(
///     out.mathml,
///     "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\
///      <mfrac><mrow><mn>1</mn></mrow><mrow><mn>2</mn></mrow></mfrac></math>"
/// );
/// ```
pub fn latex_to_mathml(latex: &str) -> Transliteration {
    let body = strip_inline_shifts(&strip_display_delimiters(latex));
    let mut transliterator = Transliterator::default();

    let rows = transliterator.rows(&body);
    let inner = if rows.len() > 1 {
        transliterator.table(rows)
    } else {
        transliterator.convert(&body)
    };

    Transliteration {
        mathml: format!("<math xmlns=\"{}\">{}</math>", MATHML_NS, inner),
        diagnostics: transliterator.diagnostics,
    }
}

type Build = fn(&mut Transliterator, &str, Option<&str>, &[&str]) -> String;

/// A construct that takes arguments.
pub struct StructureRule {
    pub name: &'static str,
    pub commands: &'static [&'static str],
    pub args: usize,
    /// Accepts a `[...]` argument before the mandatory ones.
    pub optional: bool,
    build: Build,
}

pub static STRUCTURE_RULES: &[StructureRule] = &[
    StructureRule {
        name: "fraction",
        commands: &["frac", "dfrac", "tfrac", "cfrac"],
        args: 2,
        optional: false,
        build: build_fraction,
    },
    StructureRule {
        name: "binomial",
        commands: &["binom", "dbinom", "tbinom"],
        args: 2,
        optional: false,
        build: build_binomial,
    },
    StructureRule {
        name: "root",
        commands: &["sqrt"],
        args: 1,
        optional: true,
        build: build_root,
    },
    StructureRule {
        name: "text",
        commands: &["text", "textrm", "textbf", "textit", "mbox"],
        args: 1,
        optional: false,
        build: build_text,
    },
    StructureRule {
        name: "upright",
        commands: &["mathrm", "operatorname"],
        args: 1,
        optional: false,
        build: build_upright,
    },
    StructureRule {
        name: "font",
        commands: &[
            "mathbf", "mathit", "mathbb", "mathcal", "mathfrak", "mathsf", "mathtt",
            "boldsymbol",
        ],
        args: 1,
        optional: false,
        build: build_font,
    },
    StructureRule {
        name: "accent",
        commands: &[
            "hat", "widehat", "bar", "overline", "vec", "dot", "ddot", "tilde", "widetilde",
        ],
        args: 1,
        optional: false,
        build: build_accent,
    },
    StructureRule {
        name: "underline",
        commands: &["underline"],
        args: 1,
        optional: false,
        build: build_underline,
    },
    StructureRule {
        name: "color",
        commands: &["color", "textcolor"],
        args: 2,
        optional: false,
        build: build_color,
    },
    StructureRule {
        name: "boxed",
        commands: &["boxed"],
        args: 1,
        optional: false,
        build: build_boxed,
    },
];

fn build_fraction(t: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!("<mfrac>{}{}</mfrac>", t.row(args[0]), t.row(args[1]))
}

fn build_binomial(t: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!(
        "<mrow><mo>(</mo><mfrac linethickness=\"0\">{}{}</mfrac><mo>)</mo></mrow>",
        t.row(args[0]),
        t.row(args[1])
    )
}

fn build_root(t: &mut Transliterator, _: &str, index: Option<&str>, args: &[&str]) -> String {
    match index {
        Some(index) => format!("<mroot>{}{}</mroot>", t.row(args[0]), t.row(index)),
        None => format!("<msqrt>{}</msqrt>", t.row(args[0])),
    }
}

fn build_text(_: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!("<mtext>{}</mtext>", escape_text(&xml_text(args[0])))
}

fn build_upright(_: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!(
        "<mi mathvariant=\"normal\">{}</mi>",
        escape_text(&xml_text(args[0].trim()))
    )
}

fn build_font(t: &mut Transliterator, command: &str, _: Option<&str>, args: &[&str]) -> String {
    let variant = match command {
        "mathbf" => "bold",
        "mathit" => "italic",
        "mathbb" => "double-struck",
        "mathcal" => "script",
        "mathfrak" => "fraktur",
        "mathsf" => "sans-serif",
        "mathtt" => "monospace",
        _ => "bold-italic",
    };
    format!(
        "<mstyle mathvariant=\"{}\">{}</mstyle>",
        variant,
        t.convert(args[0])
    )
}

fn build_accent(t: &mut Transliterator, command: &str, _: Option<&str>, args: &[&str]) -> String {
    let mark = match command {
        "hat" | "widehat" => "^",
        "bar" | "overline" => "\u{AF}",
        "vec" => "\u{2192}",
        "dot" => "\u{2D9}",
        "ddot" => "\u{A8}",
        _ => "~",
    };
    format!(
        "<mover accent=\"true\">{}<mrow><mo>{}</mo></mrow></mover>",
        t.row(args[0]),
        mark
    )
}

fn build_underline(t: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!("<munder>{}<mrow><mo>_</mo></mrow></munder>", t.row(args[0]))
}

fn build_color(t: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!(
        "<mstyle mathcolor=\"{}\">{}</mstyle>",
        escape_attribute(&xml_text(args[0].trim())),
        t.convert(args[1])
    )
}

fn build_boxed(t: &mut Transliterator, _: &str, _: Option<&str>, args: &[&str]) -> String {
    format!("<menclose notation=\"box\">{}</menclose>", t.row(args[0]))
}

#[derive(Debug, Clone, Copy)]
enum Symbol {
    Identifier(&'static str),
    Operator(&'static str),
    /// A named function such as `\sin`, rendered upright by name.
    Function,
    Space(&'static str),
    /// Layout hints with no MathML counterpart.
    Silent,
}

impl Symbol {
    fn markup(self, name: &str) -> Option<String> {
        match self {
            Symbol::Identifier(c) => Some(format!("<mi>{}</mi>", c)),
            Symbol::Operator(c) => Some(format!("<mo>{}</mo>", c)),
            Symbol::Function => Some(format!("<mi>{}</mi>", name)),
            Symbol::Space(width) => Some(format!("<mspace width=\"{}\"/>", width)),
            Symbol::Silent => None,
        }
    }
}

static SYMBOLS: Lazy<HashMap<&'static str, Symbol>> = Lazy::new(|| {
    use Symbol::*;

    let identifiers: &[(&str, &str)] = &[
        ("alpha", "α"), ("beta", "β"), ("gamma", "γ"), ("delta", "δ"), ("epsilon", "ϵ"),
        ("varepsilon", "ε"), ("zeta", "ζ"), ("eta", "η"), ("theta", "θ"), ("vartheta", "ϑ"),
        ("iota", "ι"), ("kappa", "κ"), ("lambda", "λ"), ("mu", "μ"), ("nu", "ν"), ("xi", "ξ"),
        ("pi", "π"), ("varpi", "ϖ"), ("rho", "ρ"), ("varrho", "ϱ"), ("sigma", "σ"),
        ("varsigma", "ς"), ("tau", "τ"), ("upsilon", "υ"), ("phi", "ϕ"), ("varphi", "φ"),
        ("chi", "χ"), ("psi", "ψ"), ("omega", "ω"), ("Gamma", "Γ"), ("Delta", "Δ"),
        ("Theta", "Θ"), ("Lambda", "Λ"), ("Xi", "Ξ"), ("Pi", "Π"), ("Sigma", "Σ"),
        ("Upsilon", "Υ"), ("Phi", "Φ"), ("Psi", "Ψ"), ("Omega", "Ω"), ("infty", "∞"),
        ("partial", "∂"), ("nabla", "∇"), ("hbar", "ℏ"), ("ell", "ℓ"), ("emptyset", "∅"),
        ("varnothing", "∅"), ("aleph", "ℵ"), ("Re", "ℜ"), ("Im", "ℑ"),
    ];
    let operators: &[(&str, &str)] = &[
        ("sum", "∑"), ("prod", "∏"), ("coprod", "∐"), ("int", "∫"), ("iint", "∬"),
        ("iiint", "∭"), ("oint", "∮"), ("bigcup", "⋃"), ("bigcap", "⋂"), ("bigoplus", "⨁"),
        ("bigotimes", "⨂"), ("cdot", "⋅"), ("times", "×"), ("div", "÷"), ("pm", "±"),
        ("mp", "∓"), ("ast", "∗"), ("star", "⋆"), ("circ", "∘"), ("bullet", "∙"),
        ("oplus", "⊕"), ("otimes", "⊗"), ("cup", "∪"), ("cap", "∩"), ("setminus", "∖"),
        ("leq", "≤"), ("le", "≤"), ("geq", "≥"), ("ge", "≥"), ("neq", "≠"), ("ne", "≠"),
        ("approx", "≈"), ("equiv", "≡"), ("sim", "∼"), ("simeq", "≃"), ("cong", "≅"),
        ("propto", "∝"), ("ll", "≪"), ("gg", "≫"), ("in", "∈"), ("notin", "∉"), ("ni", "∋"),
        ("subset", "⊂"), ("subseteq", "⊆"), ("supset", "⊃"), ("supseteq", "⊇"),
        ("mid", "∣"), ("parallel", "∥"), ("perp", "⊥"), ("to", "→"), ("rightarrow", "→"),
        ("gets", "←"), ("leftarrow", "←"), ("Rightarrow", "⇒"), ("Leftarrow", "⇐"),
        ("leftrightarrow", "↔"), ("Leftrightarrow", "⇔"), ("implies", "⟹"), ("iff", "⟺"),
        ("mapsto", "↦"), ("longrightarrow", "⟶"), ("Longrightarrow", "⟹"), ("forall", "∀"),
        ("exists", "∃"), ("neg", "¬"), ("lnot", "¬"), ("land", "∧"), ("wedge", "∧"),
        ("lor", "∨"), ("vee", "∨"), ("angle", "∠"), ("triangle", "△"), ("prime", "′"),
        ("ldots", "…"), ("dots", "…"), ("cdots", "⋯"), ("vdots", "⋮"), ("ddots", "⋱"),
        ("therefore", "∴"), ("because", "∵"), ("langle", "⟨"), ("rangle", "⟩"),
        ("lfloor", "⌊"), ("rfloor", "⌋"), ("lceil", "⌈"), ("rceil", "⌉"), ("vert", "|"),
        ("lvert", "|"), ("rvert", "|"), ("Vert", "‖"), ("degree", "°"),
    ];
    let functions = [
        "sin", "cos", "tan", "cot", "sec", "csc", "arcsin", "arccos", "arctan", "sinh", "cosh",
        "tanh", "log", "ln", "lg", "exp", "lim", "max", "min", "sup", "inf", "det", "dim", "gcd",
        "deg", "arg", "mod", "bmod",
    ];
    let silent = [
        "displaystyle", "textstyle", "scriptstyle", "limits", "nolimits", "nonumber", "notag",
    ];

    let mut map = HashMap::new();
    for &(name, c) in identifiers {
        map.insert(name, Identifier(c));
    }
    for &(name, c) in operators {
        map.insert(name, Operator(c));
    }
    for name in functions {
        map.insert(name, Function);
    }
    for name in silent {
        map.insert(name, Silent);
    }
    map.insert("quad", Space("1em"));
    map.insert("qquad", Space("2em"));
    map
});

/// Commands that size the delimiter after them.
const SIZED_DELIMITERS: &[&str] = &[
    "left", "right", "middle", "big", "Big", "bigg", "Bigg", "bigl", "bigr", "Bigl", "Bigr",
];

enum Atom {
    Plain(String),
    Scripted {
        base: String,
        sub: Option<String>,
        sup: Option<String>,
    },
}

impl Atom {
    fn render(self) -> String {
        match self {
            Atom::Plain(markup) => markup,
            Atom::Scripted {
                base,
                sub: Some(sub),
                sup: Some(sup),
            } => format!(
                "<msubsup><mrow>{}</mrow><mrow>{}</mrow><mrow>{}</mrow></msubsup>",
                base, sub, sup
            ),
            Atom::Scripted {
                base,
                sub: Some(sub),
                sup: None,
            } => format!("<msub><mrow>{}</mrow><mrow>{}</mrow></msub>", base, sub),
            Atom::Scripted {
                base,
                sub: None,
                sup: Some(sup),
            } => format!("<msup><mrow>{}</mrow><mrow>{}</mrow></msup>", base, sup),
            Atom::Scripted { base, .. } => base,
        }
    }
}

#[derive(Default)]
struct Transliterator {
    diagnostics: Vec<Diagnostic>,
}

impl Transliterator {
    fn convert(&mut self, text: &str) -> String {
        let mut atoms = Vec::new();
        let mut pos = 0;
        while let Some(c) = text[pos..].chars().next() {
            pos = self.step(text, pos, c, &mut atoms);
        }
        atoms.into_iter().map(Atom::render).collect()
    }

    fn row(&mut self, text: &str) -> String {
        format!("<mrow>{}</mrow>", self.convert(text))
    }

    fn report(&mut self, category: DiagnosticCategory, message: String) {
        log::debug!("transliteration: {}", message);
        self.diagnostics.push(Diagnostic::new(category, message));
    }

    /// Consumes one construct starting at `pos` and returns the offset after it.
    fn step(&mut self, text: &str, pos: usize, c: char, atoms: &mut Vec<Atom>) -> usize {
        let next = pos + c.len_utf8();
        match c {
            '\\' => self.command(text, pos, atoms),
            '^' | '_' => self.script(text, pos, c, atoms),
            '{' => match group_end(text, pos) {
                Some(end) => {
                    let inner = self.row(&text[pos + 1..end - 1]);
                    atoms.push(Atom::Plain(inner));
                    end
                }
                None => {
                    self.report(DiagnosticCategory::Syntax, "unclosed '{'".to_string());
                    next
                }
            },
            '}' => {
                self.report(DiagnosticCategory::Syntax, "unmatched '}'".to_string());
                next
            }
            '&' | '$' => next,
            '%' => text[pos..].find('\n').map_or(text.len(), |i| pos + i),
            c if c.is_whitespace() || !is_xml_char(c) => next,
            c if c.is_ascii_digit() => {
                let end = number_end(text, pos);
                atoms.push(Atom::Plain(format!("<mn>{}</mn>", &text[pos..end])));
                end
            }
            c if c.is_alphabetic() => {
                atoms.push(Atom::Plain(format!("<mi>{}</mi>", c)));
                next
            }
            '*' => {
                atoms.push(Atom::Plain("<mo>×</mo>".to_string()));
                next
            }
            '/' => {
                atoms.push(Atom::Plain("<mo>÷</mo>".to_string()));
                next
            }
            c => {
                atoms.push(Atom::Plain(format!(
                    "<mo>{}</mo>",
                    escape_text(c.encode_utf8(&mut [0; 4]))
                )));
                next
            }
        }
    }

    fn command(&mut self, text: &str, pos: usize, atoms: &mut Vec<Atom>) -> usize {
        let rest = &text[pos + 1..];
        let Some(c) = rest.chars().next() else {
            atoms.push(Atom::Plain("<mo>\\</mo>".to_string()));
            return pos + 1;
        };

        if c == '\\' {
            atoms.push(Atom::Plain("<mspace linebreak=\"newline\"/>".to_string()));
            return pos + 2;
        }
        if !c.is_ascii_alphabetic() {
            if let Some(markup) = escaped_symbol(c) {
                atoms.push(Atom::Plain(markup));
            }
            return pos + 1 + c.len_utf8();
        }

        let len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        let name = &rest[..len];
        let end = pos + 1 + len;

        if name == "begin" {
            return self.environment(text, end, atoms);
        }
        if name == "end" {
            self.report(DiagnosticCategory::Syntax, "\\end without \\begin".to_string());
            return argument_span(text, end).map_or(end, |(_, e)| e);
        }
        if SIZED_DELIMITERS.contains(&name) {
            let after = &text[end..];
            let trimmed = after.trim_start();
            return if trimmed.starts_with('.') {
                end + (after.len() - trimmed.len()) + 1
            } else {
                end
            };
        }

        if let Some(rule) = STRUCTURE_RULES.iter().find(|r| r.commands.contains(&name)) {
            if let Some((markup, after)) = self.apply_rule(rule, name, text, end) {
                atoms.push(Atom::Plain(markup));
                return after;
            }
            self.report(
                DiagnosticCategory::Syntax,
                format!("\\{} is missing {} argument(s)", name, rule.args),
            );
            atoms.push(Atom::Plain(format!("<mi>\\{}</mi>", name)));
            return end;
        }

        match SYMBOLS.get(name) {
            Some(symbol) => {
                if let Some(markup) = symbol.markup(name) {
                    atoms.push(Atom::Plain(markup));
                }
            }
            None => {
                self.report(
                    DiagnosticCategory::UndefinedCommand,
                    format!("no MathML rule for \\{}", name),
                );
                atoms.push(Atom::Plain(format!("<mi>\\{}</mi>", name)));
            }
        }
        end
    }

    fn apply_rule(
        &mut self,
        rule: &StructureRule,
        command: &str,
        text: &str,
        from: usize,
    ) -> Option<(String, usize)> {
        let mut pos = from;
        let mut optional = None;

        if rule.optional {
            let rest = &text[pos..];
            let trimmed = rest.trim_start();
            if trimmed.starts_with('[') {
                let open = pos + (rest.len() - trimmed.len());
                let close = text[open..].find(']')? + open;
                optional = Some(&text[open + 1..close]);
                pos = close + 1;
            }
        }

        let mut args = Vec::with_capacity(rule.args);
        for _ in 0..rule.args {
            let (start, end) = argument_span(text, pos)?;
            args.push(unbrace(&text[start..end]));
            pos = end;
        }

        log::trace!("rule {} matched \\{}", rule.name, command);
        Some(((rule.build)(self, command, optional, &args), pos))
    }

    fn script(&mut self, text: &str, pos: usize, marker: char, atoms: &mut Vec<Atom>) -> usize {
        let (operand, end) = match argument_span(text, pos + 1) {
            Some((start, end)) => (self.convert(unbrace(&text[start..end])), end),
            None => {
                self.report(
                    DiagnosticCategory::Syntax,
                    format!("'{}' has no operand", marker),
                );
                (String::new(), pos + 1)
            }
        };

        let is_sub = marker == '_';
        let atom = match atoms.pop() {
            Some(Atom::Scripted { base, sub, sup })
                if (is_sub && sub.is_none()) || (!is_sub && sup.is_none()) =>
            {
                if is_sub {
                    Atom::Scripted {
                        base,
                        sub: Some(operand),
                        sup,
                    }
                } else {
                    Atom::Scripted {
                        base,
                        sub,
                        sup: Some(operand),
                    }
                }
            }
            previous => {
                let base = previous.map(Atom::render).unwrap_or_default();
                if is_sub {
                    Atom::Scripted {
                        base,
                        sub: Some(operand),
                        sup: None,
                    }
                } else {
                    Atom::Scripted {
                        base,
                        sub: None,
                        sup: Some(operand),
                    }
                }
            }
        };
        atoms.push(atom);
        end
    }

    fn environment(&mut self, text: &str, after_begin: usize, atoms: &mut Vec<Atom>) -> usize {
        let Some((start, end)) = argument_span(text, after_begin)
            .filter(|(start, _)| text[*start..].starts_with('{'))
        else {
            self.report(
                DiagnosticCategory::Syntax,
                "\\begin without an environment name".to_string(),
            );
            return after_begin;
        };
        let name = text[start + 1..end - 1].trim();
        let Some(env_end) = environment_end(text, end, name) else {
            self.report(
                DiagnosticCategory::Syntax,
                format!("\\begin{{{}}} is never closed", name),
            );
            return end;
        };

        let close_len = format!("\\end{{{}}}", name).len();
        let mut body = &text[end..env_end - close_len];
        if name == "array" {
            if let Some((_, spec_end)) =
                argument_span(body, 0).filter(|(s, _)| body[*s..].starts_with('{'))
            {
                body = &body[spec_end..];
            }
        }

        let markup = match environment_fences(name) {
            Some((open, close)) => {
                let rows = self.rows(body);
                let table = self.table(rows);
                if open.is_empty() && close.is_empty() {
                    table
                } else {
                    let fence = |f: &str| {
                        if f.is_empty() {
                            String::new()
                        } else {
                            format!("<mo>{}</mo>", f)
                        }
                    };
                    format!("<mrow>{}{}{}</mrow>", fence(open), table, fence(close))
                }
            }
            None => {
                self.report(
                    DiagnosticCategory::UndefinedCommand,
                    format!("no MathML rule for environment {}", name),
                );
                self.row(body)
            }
        };
        atoms.push(Atom::Plain(markup));
        env_end
    }

    /// Splits `body` into rows and cells at the top level.
    fn rows(&mut self, body: &str) -> Vec<Vec<String>> {
        let mut map = PlaceholderMap::new();
        let protected = map.protect(body);
        let collapsed = collapse_line_breaks(&protected);
        split_rows(&collapsed)
            .into_iter()
            .map(|row| {
                split_cells(row)
                    .into_iter()
                    .map(|cell| map.restore(cell.trim()))
                    .collect()
            })
            .collect()
    }

    fn table(&mut self, rows: Vec<Vec<String>>) -> String {
        let mut out = String::from("<mtable>");
        for row in rows {
            out.push_str("<mtr>");
            for cell in row {
                out.push_str("<mtd>");
                out.push_str(&self.convert(&cell));
                out.push_str("</mtd>");
            }
            out.push_str("</mtr>");
        }
        out.push_str("</mtable>");
        out
    }
}

fn environment_fences(name: &str) -> Option<(&'static str, &'static str)> {
    let fences = match name {
        "matrix" | "smallmatrix" | "array" | "aligned" | "align" | "align*" | "alignat"
        | "gathered" | "gather" | "gather*" | "split" | "equation" | "equation*" => ("", ""),
        "pmatrix" => ("(", ")"),
        "bmatrix" => ("[", "]"),
        "Bmatrix" => ("{", "}"),
        "vmatrix" => ("|", "|"),
        "Vmatrix" => ("‖", "‖"),
        "cases" => ("{", ""),
        _ => return None,
    };
    Some(fences)
}

fn escaped_symbol(c: char) -> Option<String> {
    let markup = match c {
        ',' => "<mspace width=\"0.167em\"/>".to_string(),
        ':' | '>' => "<mspace width=\"0.222em\"/>".to_string(),
        ';' => "<mspace width=\"0.278em\"/>".to_string(),
        ' ' => "<mspace width=\"0.25em\"/>".to_string(),
        '!' => return None,
        c if !is_xml_char(c) => return None,
        '|' => "<mo>‖</mo>".to_string(),
        c => format!("<mo>{}</mo>", escape_text(c.encode_utf8(&mut [0; 4]))),
    };
    Some(markup)
}

/// Characters XML 1.0 cannot carry, apart from the usual whitespace.
fn is_xml_char(c: char) -> bool {
    !(c.is_control() && !matches!(c, '\t' | '\n' | '\r')) && !matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

fn xml_text(text: &str) -> String {
    text.chars().filter(|c| is_xml_char(*c)).collect()
}

/// Splits a row at `&` tabs that are not escaped.
fn split_cells(row: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in row.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '&' if !escaped => {
                cells.push(&row[start..i]);
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    cells.push(&row[start..]);
    cells
}

fn number_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    end
}

fn unbrace(arg: &str) -> &str {
    if arg.len() >= 2 && arg.starts_with('{') && arg.ends_with('}') {
        &arg[1..arg.len() - 1]
    } else {
        arg
    }
}

/// Drops unescaped `$` math shifts left inside the expression.
fn strip_inline_shifts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0;
    for c in text.chars() {
        if c == '$' && backslashes % 2 == 0 {
            backslashes = 0;
            continue;
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mathml::MathmlValidator;
    use expect_test::expect;

    fn body(latex: &str) -> String {
        let out = latex_to_mathml(latex).mathml;
        out.trim_start_matches("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">")
            .trim_end_matches("</math>")
            .to_string()
    }

    #[test]
    fn test_scripts() {
        expect![[r#"<msup><mrow><mi>x</mi></mrow><mrow><mn>2</mn></mrow></msup><mo>+</mo><msub><mrow><mi>y</mi></mrow><mrow><mi>i</mi></mrow></msub>"#]]
            .assert_eq(&body("x^{2} + y_i"));
    }

    #[test]
    fn test_sub_then_sup_merge() {
        expect![[r#"<msubsup><mrow><mi>x</mi></mrow><mrow><mi>i</mi></mrow><mrow><mn>2</mn></mrow></msubsup>"#]]
            .assert_eq(&body("x_i^2"));
    }

    #[test]
    fn test_root_with_index() {
        expect![[r#"<mroot><mrow><mi>x</mi></mrow><mrow><mn>3</mn></mrow></mroot>"#]]
            .assert_eq(&body(r"\sqrt[3]{x}"));
        expect![[r#"<msqrt><mrow><mi>x</mi><mo>+</mo><mn>1</mn></mrow></msqrt>"#]]
            .assert_eq(&body(r"\sqrt{x + 1}"));
    }

    #[test]
    fn test_nested_fraction() {
        expect![[r#"<mfrac><mrow><mfrac><mrow><mn>1</mn></mrow><mrow><mn>2</mn></mrow></mfrac></mrow><mrow><mn>3</mn></mrow></mfrac>"#]]
            .assert_eq(&body(r"\frac{\frac{1}{2}}{3}"));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            body("3.5 * 2 / 1 = a"),
            "<mn>3.5</mn><mo>×</mo><mn>2</mn><mo>÷</mo><mn>1</mn><mo>=</mo><mi>a</mi>"
        );
        assert_eq!(body("a < b"), "<mi>a</mi><mo>&lt;</mo><mi>b</mi>");
    }

    #[test]
    fn test_symbols_and_unknown_commands() {
        let out = latex_to_mathml(r"\alpha + \foo");
        assert!(out.mathml.contains("<mi>α</mi><mo>+</mo><mi>\\foo</mi>"));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(
            out.diagnostics[0].category,
            DiagnosticCategory::UndefinedCommand
        );
    }

    #[test]
    fn test_text_is_not_transliterated() {
        assert_eq!(
            body(r"5 \text{ m/s}"),
            "<mn>5</mn><mtext> m/s</mtext>"
        );
    }

    #[test]
    fn test_sized_delimiters() {
        assert_eq!(
            body(r"\left( x \right)"),
            "<mo>(</mo><mi>x</mi><mo>)</mo>"
        );
        assert_eq!(body(r"\left. x \right|"), "<mi>x</mi><mo>|</mo>");
    }

    #[test]
    fn test_matrix() {
        expect![[r#"<mrow><mo>(</mo><mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>0</mn></mtd></mtr><mtr><mtd><mn>0</mn></mtd><mtd><mn>1</mn></mtd></mtr></mtable><mo>)</mo></mrow>"#]]
            .assert_eq(&body(r"\begin{pmatrix} 1 & 0 \\ 0 & 1 \end{pmatrix}"));
    }

    #[test]
    fn test_rows_become_table() {
        assert_eq!(
            body(r"\[\begin{align*} a &= b \\ &= c \end{align*}\]"),
            "<mtable><mtr><mtd><mi>a</mi></mtd><mtd><mo>=</mo><mi>b</mi></mtd></mtr>\
             <mtr><mtd></mtd><mtd><mo>=</mo><mi>c</mi></mtd></mtr></mtable>"
        );
    }

    #[test]
    fn test_missing_arguments_reported() {
        let out = latex_to_mathml(r"\frac{1}");
        assert_eq!(out.diagnostics[0].category, DiagnosticCategory::Syntax);
        assert!(out.mathml.contains("<mi>\\frac</mi>"));
    }

    #[test]
    fn test_inline_shifts_dropped() {
        assert_eq!(body("$x$"), "<mi>x</mi>");
        assert_eq!(strip_inline_shifts(r"a \$ b $c$"), r"a \$ b c");
    }

    #[test]
    fn test_output_always_validates() {
        let validator = MathmlValidator::new();
        let inputs = [
            r"\frac{1}{2}",
            r"x_i^2 + \sqrt[n]{y}",
            r"\hat{x} + \vec v + \overline{AB}",
            r"\mathbf{v} \cdot \mathbb{R} = \color{red}{x}",
            r"\binom{n}{k} \boxed{42}",
            r"\begin{cases} 1 & x > 0 \\ 0 & \text{otherwise} \end{cases}",
            r"a \\ b \\ c",
            r"^2",
            r"\foo{x}",
            r"\sum_{i=1}^{n} i = \frac{n(n+1)}{2}",
            r"\int_0^\infty e^{-x} \, dx",
        ];
        for input in inputs {
            let out = latex_to_mathml(input);
            let validation = validator.validate(&out.mathml);
            assert!(
                validation.is_valid,
                "{input}: {:?}\n{}",
                validation.diagnostics,
                out.mathml
            );
        }
    }
}
