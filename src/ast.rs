//! The AST handed to the checker: a closed tree of numbers, text, symbols and lists.
//!
//! The reader produces these, but anything able to build the same shape (tests, embedders)
//! can feed the checker directly.
use core::fmt;

use arbitrary::Arbitrary;

#[derive(Debug, Clone, PartialEq, Arbitrary)]
pub enum AstNode {
    Number(f64),
    /// Literal text, only meaningful as the argument of `quote`
    Text(Box<str>),
    /// A bare token: identifiers, boolean literals and operator keywords
    Symbol(Box<str>),
    List(Box<[AstNode]>),
}

impl AstNode {
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Self::Symbol(Box::from(name.as_ref()))
    }

    pub fn text(text: impl AsRef<str>) -> Self {
        Self::Text(Box::from(text.as_ref()))
    }

    pub fn list(items: impl IntoIterator<Item = AstNode>) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AstNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The operator symbol of a list, if it has one
    pub fn head_symbol(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }
}

impl From<f64> for AstNode {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => write!(f, "{t:?}"),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Builds an [`AstNode`] with S-expression-like syntax.
///
/// Bare identifiers become symbols, string literals become symbols too (so operators like
/// `"+"` can be written), numeric literals become numbers and `[...]` nests a list.
/// `(text "...")` produces a [`AstNode::Text`] leaf.
#[macro_export]
macro_rules! sexp {
    ([$($item:tt)*]) => {
        $crate::AstNode::list([$($crate::sexp!(@item $item)),*])
    };
    (@item [$($item:tt)*]) => {
        $crate::sexp!([$($item)*])
    };
    (@item (text $t:literal)) => {
        $crate::AstNode::text($t)
    };
    (@item $s:ident) => {
        $crate::AstNode::symbol(stringify!($s))
    };
    (@item $l:literal) => {
        $crate::AstNode::from($l)
    };
}

impl From<&str> for AstNode {
    fn from(value: &str) -> Self {
        Self::symbol(value)
    }
}

impl From<i32> for AstNode {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::AstNode;

    #[test]
    fn display_as_sexp() {
        let node = sexp!([let x [quote (text "hi there")]]);
        check!(node.to_string() == r#"(let x (quote "hi there"))"#);

        let node = sexp!([print ["+" 1 2.5]]);
        check!(node.to_string() == "(print (+ 1 2.5))");
    }

    #[test]
    fn head_symbol() {
        check!(sexp!([print 1]).head_symbol() == Some("print"));
        check!(sexp!([[print] 1]).head_symbol() == None);
        check!(sexp!([]).head_symbol() == None);
        check!(AstNode::symbol("x").head_symbol() == None);
    }
}
