//! Enumerations decoded from replay attribute codes

use std::fmt;

macro_rules! attribute_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $code:literal, $label:literal;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub enum $name {
            /// Missing or unrecognized code
            #[default]
            Unknown,
            $($(#[$variant_meta])* $variant,)*
        }

        impl $name {
            /// Map an attribute code, falling back to `Unknown`
            pub fn from_code(code: &str) -> Self {
                match code {
                    $($code => $name::$variant,)*
                    _ => $name::Unknown,
                }
            }

            /// Human readable name
            pub fn name(self) -> &'static str {
                match self {
                    $name::Unknown => "Unknown",
                    $($name::$variant => $label,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

attribute_enum! {
    /// Team layout of the game
    GameType {
        /// One versus one
        OneVsOne => "1v1", "1v1";
        /// Two versus two
        TwoVsTwo => "2v2", "2v2";
        /// Three versus three
        ThreeVsThree => "3v3", "3v3";
        /// Four versus four
        FourVsFour => "4v4", "4v4";
        /// Free for all
        FreeForAll => "FFA", "FFA";
        /// Six versus six
        SixVsSix => "6v6", "6v6";
        /// Custom teams
        Custom => "Cust", "Custom";
    }
}

attribute_enum! {
    /// Game speed setting
    GameSpeed {
        /// Slower
        Slower => "Slor", "Slower";
        /// Slow
        Slow => "Slow", "Slow";
        /// Normal
        Normal => "Norm", "Normal";
        /// Fast
        Fast => "Fast", "Fast";
        /// Faster
        Faster => "Fasr", "Faster";
    }
}

attribute_enum! {
    /// How the game was set up
    GameCategory {
        /// Private lobby
        Private => "Priv", "Private";
        /// Automated matchmaking
        Ladder => "Amm", "Ladder";
        /// Public lobby
        Public => "Pub", "Public";
    }
}

attribute_enum! {
    /// Who controls a slot
    PlayerType {
        /// A person
        Human => "Humn", "Human";
        /// The AI
        Computer => "Comp", "Computer";
    }
}

attribute_enum! {
    /// AI difficulty
    Difficulty {
        /// Very easy
        VeryEasy => "VyEy", "Very Easy";
        /// Easy
        Easy => "Easy", "Easy";
        /// Medium
        Medium => "Medi", "Medium";
        /// Hard
        Hard => "Hard", "Hard";
        /// Very hard
        VeryHard => "VyHd", "Very Hard";
        /// Insane
        Insane => "Insa", "Insane";
    }
}

attribute_enum! {
    /// Team color picked in the lobby
    NamedColor {
        /// tc01
        Red => "tc01", "Red";
        /// tc02
        Blue => "tc02", "Blue";
        /// tc03
        Teal => "tc03", "Teal";
        /// tc04
        Purple => "tc04", "Purple";
        /// tc05
        Yellow => "tc05", "Yellow";
        /// tc06
        Orange => "tc06", "Orange";
        /// tc07
        Green => "tc07", "Green";
        /// tc08
        LightPink => "tc08", "Light Pink";
        /// tc09
        Violet => "tc09", "Violet";
        /// tc10
        LightGrey => "tc10", "Light Grey";
        /// tc11
        DarkGreen => "tc11", "Dark Green";
        /// tc12
        Brown => "tc12", "Brown";
        /// tc13
        LightGreen => "tc13", "Light Green";
        /// tc14
        DarkGrey => "tc14", "Dark Grey";
        /// tc15
        Pink => "tc15", "Pink";
    }
}

attribute_enum! {
    /// Player race
    ///
    /// Attribute codes are the short lobby forms. The details file spells
    /// the played race out; see [`Race::from_details`].
    Race {
        /// Random pick in the lobby
        Random => "RAND", "Random";
        /// Terran
        Terran => "Terr", "Terran";
        /// Protoss
        Protoss => "Prot", "Protoss";
        /// Zerg
        Zerg => "Zerg", "Zerg";
    }
}

impl Race {
    /// Map the race name stored in `replay.details`
    pub fn from_details(name: &str) -> Self {
        match name {
            "Protoss" => Race::Protoss,
            "Terran" => Race::Terran,
            "Zerg" => Race::Zerg,
            _ => Race::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(GameType::from_code("2v2"), GameType::TwoVsTwo);
        assert_eq!(GameSpeed::from_code("Fasr"), GameSpeed::Faster);
        assert_eq!(GameCategory::from_code("Amm"), GameCategory::Ladder);
        assert_eq!(PlayerType::from_code("Comp"), PlayerType::Computer);
        assert_eq!(Difficulty::from_code("VyHd"), Difficulty::VeryHard);
        assert_eq!(NamedColor::from_code("tc15"), NamedColor::Pink);
        assert_eq!(Race::from_code("RAND"), Race::Random);
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(GameType::from_code("5v5"), GameType::Unknown);
        assert_eq!(NamedColor::from_code("tc16"), NamedColor::Unknown);
        assert_eq!(Race::from_code("Protoss"), Race::Unknown);
        assert_eq!(Difficulty::default(), Difficulty::Unknown);
    }

    #[test]
    fn test_details_race_names() {
        assert_eq!(Race::from_details("Protoss"), Race::Protoss);
        assert_eq!(Race::from_details("Zerg"), Race::Zerg);
        assert_eq!(Race::from_details("Prot"), Race::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(GameSpeed::Faster.to_string(), "Faster");
        assert_eq!(NamedColor::LightGrey.to_string(), "Light Grey");
        assert_eq!(PlayerType::Unknown.to_string(), "Unknown");
    }
}
