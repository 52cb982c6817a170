//! Commands the engine accepts without an `undefined_command` diagnostic.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "varpi", "rho", "varrho",
    "sigma", "varsigma", "tau", "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma",
    "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

const OPERATORS: &[&str] = &[
    "sum", "prod", "coprod", "int", "iint", "iiint", "oint", "lim", "limsup", "liminf", "sup",
    "inf", "max", "min", "arg", "det", "dim", "gcd", "deg", "exp", "log", "ln", "lg", "sin",
    "cos", "tan", "cot", "sec", "csc", "arcsin", "arccos", "arctan", "sinh", "cosh", "tanh",
    "bigcup", "bigcap", "bigoplus", "bigotimes",
];

const RELATIONS: &[&str] = &[
    "leq", "le", "geq", "ge", "neq", "ne", "approx", "equiv", "sim", "simeq", "cong", "propto",
    "ll", "gg", "in", "notin", "ni", "subset", "subseteq", "supset", "supseteq", "mid", "parallel",
    "perp", "to", "gets", "rightarrow", "leftarrow", "Rightarrow", "Leftarrow", "leftrightarrow",
    "Leftrightarrow", "implies", "iff", "mapsto", "longrightarrow", "Longrightarrow",
];

const SYMBOLS: &[&str] = &[
    "infty", "partial", "nabla", "cdot", "cdots", "ldots", "dots", "vdots", "ddots", "times",
    "div", "pm", "mp", "ast", "star", "circ", "bullet", "oplus", "otimes", "cup", "cap",
    "setminus", "emptyset", "varnothing", "forall", "exists", "neg", "lnot", "land", "lor",
    "wedge", "vee", "angle", "triangle", "prime", "degree", "hbar", "ell", "Re", "Im", "aleph",
    "mathbb", "checkmark", "therefore", "because",
];

const STRUCTURE: &[&str] = &[
    "frac", "dfrac", "tfrac", "cfrac", "binom", "dbinom", "tbinom", "sqrt", "text", "textbf",
    "textit", "mathrm", "mathbf", "mathit", "mathsf", "mathtt", "mathcal", "mathfrak",
    "operatorname", "boldsymbol", "overline", "underline", "hat", "widehat", "tilde",
    "widetilde", "bar", "vec", "dot", "ddot", "overbrace", "underbrace", "boxed", "cancel",
    "color", "textcolor", "begin", "end", "left", "right", "big", "Big", "bigg", "Bigg",
    "bigl", "bigr", "Bigl", "Bigr", "langle", "rangle", "lfloor", "rfloor", "lceil", "rceil",
    "lvert", "rvert", "vert", "Vert", "displaystyle", "textstyle", "scriptstyle", "limits",
    "nolimits", "quad", "qquad", "hspace", "vspace", "phantom", "tag", "label", "nonumber",
    "notag", "newline", "substack", "stackrel", "overset", "underset", "pmod", "bmod", "mod",
];

static KNOWN: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    GREEK
        .iter()
        .chain(OPERATORS)
        .chain(RELATIONS)
        .chain(SYMBOLS)
        .chain(STRUCTURE)
        .copied()
        .collect()
});

/// Returns true if `name` (without the backslash) is a built-in command.
pub fn is_known(name: &str) -> bool {
    KNOWN.contains(name)
}
