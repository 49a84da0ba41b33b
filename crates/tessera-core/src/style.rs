// crates/tessera-core/src/style.rs
use crate::TesseraError;
use std::fmt;
use std::str::FromStr;

// Declares a fieldless style enum with kebab-case keywords.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $keyword:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $keyword,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = TesseraError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($keyword => Ok($name::$variant),)+
                    _ => Err(TesseraError::UnknownKeyword {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum! {
    /// Inline base direction.
    pub enum Direction {
        #[default]
        Inherit => "inherit",
        Ltr => "ltr",
        Rtl => "rtl",
    }
}

keyword_enum! {
    pub enum FlexDirection {
        #[default]
        Column => "column",
        ColumnReverse => "column-reverse",
        Row => "row",
        RowReverse => "row-reverse",
    }
}

keyword_enum! {
    pub enum Justify {
        #[default]
        FlexStart => "flex-start",
        Center => "center",
        FlexEnd => "flex-end",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    /// Used by align-items, align-self and align-content.
    pub enum Align {
        #[default]
        Auto => "auto",
        FlexStart => "flex-start",
        Center => "center",
        FlexEnd => "flex-end",
        Stretch => "stretch",
        Baseline => "baseline",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    pub enum PositionType {
        Static => "static",
        #[default]
        Relative => "relative",
        Absolute => "absolute",
    }
}

keyword_enum! {
    pub enum Wrap {
        #[default]
        NoWrap => "no-wrap",
        Wrap => "wrap",
        WrapReverse => "wrap-reverse",
    }
}

keyword_enum! {
    pub enum Overflow {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
        Scroll => "scroll",
    }
}

keyword_enum! {
    pub enum Display {
        #[default]
        Flex => "flex",
        None => "none",
    }
}

keyword_enum! {
    /// Style edge, including the logical and shorthand edges.
    pub enum Edge {
        #[default]
        Left => "left",
        Top => "top",
        Right => "right",
        Bottom => "bottom",
        Start => "start",
        End => "end",
        Horizontal => "horizontal",
        Vertical => "vertical",
        All => "all",
    }
}

keyword_enum! {
    /// Edge of a computed box.
    pub enum PhysicalEdge {
        #[default]
        Left => "left",
        Top => "top",
        Right => "right",
        Bottom => "bottom",
    }
}

keyword_enum! {
    pub enum Dimension {
        #[default]
        Width => "width",
        Height => "height",
    }
}

keyword_enum! {
    pub enum Gutter {
        Column => "column",
        Row => "row",
        #[default]
        All => "all",
    }
}

keyword_enum! {
    /// How an available length constrains a box.
    pub enum SizingMode {
        /// Size to content, no constraint
        #[default]
        MaxContent => "max-content",
        /// Size to content, capped by the available length
        FitContent => "fit-content",
        /// Size is forced to the available length
        StretchFit => "stretch-fit",
    }
}

keyword_enum! {
    pub enum NodeType {
        #[default]
        Default => "default",
        Text => "text",
    }
}

impl Edge {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl PhysicalEdge {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Dimension {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Gutter {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Storage for one `T` per style edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T>([T; 9]);

impl<T: Copy> Edges<T> {
    pub fn get(&self, edge: Edge) -> T {
        self.0[edge.index()]
    }

    pub fn set(&mut self, edge: Edge, value: T) {
        self.0[edge.index()] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for align in Align::ALL {
            assert_eq!(align.as_str().parse::<Align>().unwrap(), *align);
        }
        assert_eq!("row-reverse".parse::<FlexDirection>().unwrap(), FlexDirection::RowReverse);
    }

    #[test]
    fn test_unknown_keyword() {
        let err = "sideways".parse::<Wrap>().unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(FlexDirection::default(), FlexDirection::Column);
        assert_eq!(PositionType::default(), PositionType::Relative);
        assert_eq!(Align::default(), Align::Auto);
        assert_eq!(SizingMode::default(), SizingMode::MaxContent);
    }
}
