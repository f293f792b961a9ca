//! Enumerated configuration values.

use std::fmt;

use super::key::ConfigEnum;

/// Gender presentation selection.
///
/// Ordinals are wire format (legacy documents store the number); never
/// reorder the variant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn can_have_breasts(self) -> bool {
        !matches!(self, Gender::Male)
    }
}

impl ConfigEnum for Gender {
    const VARIANTS: &'static [Self] = &[Gender::Male, Gender::Female, Gender::Other];

    fn name(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

/// Displayed pronoun set entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pronoun {
    She,
    He,
    They,
    It,
}

impl Pronoun {
    pub fn subjective(self) -> &'static str {
        match self {
            Pronoun::She => "she",
            Pronoun::He => "he",
            Pronoun::They => "they",
            Pronoun::It => "it",
        }
    }

    pub fn objective(self) -> &'static str {
        match self {
            Pronoun::She => "her",
            Pronoun::He => "him",
            Pronoun::They => "them",
            Pronoun::It => "its",
        }
    }

    /// Display form for a selected pronoun list: `she/her` for a single
    /// entry, `she/they` for a pair. Entries past the second are not shown.
    pub fn format(pronouns: &[Pronoun]) -> Option<String> {
        match pronouns {
            [] => None,
            [only] => Some(only.to_string()),
            [first, second, ..] => Some(format!("{}/{}", first.subjective(), second.subjective())),
        }
    }
}

impl fmt::Display for Pronoun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subjective(), self.objective())
    }
}

impl ConfigEnum for Pronoun {
    const VARIANTS: &'static [Self] = &[Pronoun::She, Pronoun::He, Pronoun::They, Pronoun::It];

    fn name(&self) -> &'static str {
        match self {
            Pronoun::She => "SHE",
            Pronoun::He => "HE",
            Pronoun::They => "THEY",
            Pronoun::It => "IT",
        }
    }
}

/// How much detail the sync log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncVerbosity {
    /// Outcome entries only.
    Default,
    /// Outcome entries plus per-attempt detail.
    Verbose,
    /// Failures only.
    Silent,
}

impl ConfigEnum for SyncVerbosity {
    const VARIANTS: &'static [Self] = &[
        SyncVerbosity::Default,
        SyncVerbosity::Verbose,
        SyncVerbosity::Silent,
    ];

    fn name(&self) -> &'static str {
        match self {
            SyncVerbosity::Default => "DEFAULT",
            SyncVerbosity::Verbose => "VERBOSE",
            SyncVerbosity::Silent => "SILENT",
        }
    }
}

/// When the in-world player list overlay is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowPlayerListMode {
    ModUiOnly,
    TabList,
    Always,
}

impl ConfigEnum for ShowPlayerListMode {
    const VARIANTS: &'static [Self] = &[
        ShowPlayerListMode::ModUiOnly,
        ShowPlayerListMode::TabList,
        ShowPlayerListMode::Always,
    ];

    fn name(&self) -> &'static str {
        match self {
            ShowPlayerListMode::ModUiOnly => "MOD_UI_ONLY",
            ShowPlayerListMode::TabList => "TAB_LIST",
            ShowPlayerListMode::Always => "ALWAYS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_breast_capability() {
        assert!(!Gender::Male.can_have_breasts());
        assert!(Gender::Female.can_have_breasts());
        assert!(Gender::Other.can_have_breasts());
    }

    #[test]
    fn pronoun_format() {
        assert_eq!(Pronoun::format(&[]), None);
        assert_eq!(Pronoun::format(&[Pronoun::She]), Some("she/her".into()));
        assert_eq!(
            Pronoun::format(&[Pronoun::She, Pronoun::They]),
            Some("she/they".into())
        );
    }

    #[test]
    fn enum_name_round_trip() {
        for gender in Gender::VARIANTS {
            assert_eq!(Gender::from_name(gender.name()), Some(*gender));
        }
        for pronoun in Pronoun::VARIANTS {
            assert_eq!(
                Pronoun::from_ordinal(pronoun.ordinal() as u64),
                Some(*pronoun)
            );
        }
    }
}
