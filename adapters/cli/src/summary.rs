use std::{collections::BTreeMap, error::Error, fmt, str::FromStr};

use memorize_core::{ElementCatalog, FigureType, Tally};

/// Highest count a player may submit for one element.
pub(crate) const MAX_GUESS: u32 = 99;

const GUESS_DELIMITER: char = '=';

/// Count recalled by the player for one element, written as `ELEMENT=N`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Guess {
    element: String,
    count: u32,
}

impl FromStr for Guess {
    type Err = GuessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (element, count) = value
            .split_once(GUESS_DELIMITER)
            .ok_or_else(|| GuessError::MissingDelimiter(value.to_owned()))?;
        let element = element.trim();
        if element.is_empty() {
            return Err(GuessError::EmptyElement);
        }
        let count: u32 = count
            .trim()
            .parse()
            .map_err(|_| GuessError::InvalidCount(count.trim().to_owned()))?;
        if count > MAX_GUESS {
            return Err(GuessError::CountOutOfRange(count));
        }

        Ok(Self {
            element: element.to_owned(),
            count,
        })
    }
}

/// Errors that can occur while interpreting submitted guesses.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GuessError {
    /// The guess did not contain `=`.
    MissingDelimiter(String),
    /// Nothing preceded the `=`.
    EmptyElement,
    /// The count was not a non-negative integer.
    InvalidCount(String),
    /// The count exceeded [`MAX_GUESS`].
    CountOutOfRange(u32),
    /// No figure type of this session is shown as the named element.
    UnknownElement(String),
    /// The same element was guessed more than once.
    DuplicateElement(String),
}

impl fmt::Display for GuessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDelimiter(value) => {
                write!(f, "guess `{value}` must be written as ELEMENT=COUNT")
            }
            Self::EmptyElement => f.write_str("guess is missing the element name"),
            Self::InvalidCount(value) => write!(f, "`{value}` is not a valid count"),
            Self::CountOutOfRange(count) => {
                write!(f, "count {count} exceeds the maximum of {MAX_GUESS}")
            }
            Self::UnknownElement(name) => write!(f, "`{name}` was not shown in this session"),
            Self::DuplicateElement(name) => write!(f, "`{name}` was guessed more than once"),
        }
    }
}

impl Error for GuessError {}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SummaryRow {
    label: String,
    actual: u32,
    guess: Option<u32>,
}

impl SummaryRow {
    fn is_correct(&self) -> bool {
        self.guess == Some(self.actual)
    }
}

/// Comparison of the final counts against the player's guesses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    rows: Vec<SummaryRow>,
    submitted: bool,
}

impl Summary {
    /// Builds the summary of a finished session.
    ///
    /// Once any guess is submitted, elements without a guess count as zero.
    pub(crate) fn new(
        catalog: &ElementCatalog,
        counts: &Tally,
        guesses: &[Guess],
    ) -> Result<Self, GuessError> {
        let mut resolved: BTreeMap<FigureType, u32> = BTreeMap::new();
        for guess in guesses {
            let figure_type = resolve(catalog, &guess.element)
                .ok_or_else(|| GuessError::UnknownElement(guess.element.clone()))?;
            if resolved.insert(figure_type, guess.count).is_some() {
                return Err(GuessError::DuplicateElement(guess.element.clone()));
            }
        }

        let submitted = !guesses.is_empty();
        let rows = counts
            .iter()
            .map(|(figure_type, actual)| SummaryRow {
                label: label(catalog.name(figure_type).unwrap_or("figure")),
                actual,
                guess: submitted.then(|| resolved.get(&figure_type).copied().unwrap_or(0)),
            })
            .collect();

        Ok(Self { rows, submitted })
    }

    /// Number of elements guessed exactly.
    #[must_use]
    pub(crate) fn correct(&self) -> usize {
        self.rows.iter().filter(|row| row.is_correct()).count()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Check your result:")?;
        for row in &self.rows {
            match row.guess {
                None => writeln!(f, "  {:<16} {:>3}", format!("{}:", row.label), row.actual)?,
                Some(guess) if row.is_correct() => {
                    writeln!(f, "  {:<16} {:>3}  correct", format!("{}:", row.label), guess)?
                }
                Some(guess) => writeln!(
                    f,
                    "  {:<16} {:>3}  wrong, was {}",
                    format!("{}:", row.label),
                    guess,
                    row.actual
                )?,
            }
        }
        if self.submitted {
            write!(f, "{} of {} correct", self.correct(), self.rows.len())?;
        }
        Ok(())
    }
}

fn resolve(catalog: &ElementCatalog, element: &str) -> Option<FigureType> {
    catalog.find(element).or_else(|| {
        catalog
            .iter()
            .map(|(figure_type, _)| figure_type)
            .find(|figure_type| figure_type.to_string().eq_ignore_ascii_case(element))
    })
}

fn label(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}s", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memorize_core::{ElementForm, FlatShape};

    fn catalog() -> ElementCatalog {
        ElementCatalog::new(vec![
            ElementForm::Flat(FlatShape::Square),
            ElementForm::Flat(FlatShape::Triangle),
        ])
    }

    fn counts(square: u32, triangle: u32) -> Tally {
        let mut tally = Tally::zeroed(2);
        for _ in 0..square {
            tally.record(FigureType::new(0));
        }
        for _ in 0..triangle {
            tally.record(FigureType::new(1));
        }
        tally
    }

    #[test]
    fn parses_guesses() {
        assert_eq!(
            "Square = 4".parse::<Guess>(),
            Ok(Guess {
                element: "Square".to_owned(),
                count: 4
            })
        );
        assert_eq!(
            "square".parse::<Guess>(),
            Err(GuessError::MissingDelimiter("square".to_owned()))
        );
        assert_eq!("=3".parse::<Guess>(), Err(GuessError::EmptyElement));
        assert_eq!(
            "square=lots".parse::<Guess>(),
            Err(GuessError::InvalidCount("lots".to_owned()))
        );
        assert_eq!(
            "square=100".parse::<Guess>(),
            Err(GuessError::CountOutOfRange(100))
        );
    }

    #[test]
    fn scores_guesses_against_counts() {
        let guesses: Vec<Guess> = vec![
            "square=3".parse().expect("valid guess"),
            "type1=2".parse().expect("valid guess"),
        ];
        let summary = Summary::new(&catalog(), &counts(3, 5), &guesses).expect("known elements");

        assert_eq!(summary.correct(), 1);
        let text = summary.to_string();
        assert!(text.contains("Squares:"));
        assert!(text.contains("correct"));
        assert!(text.contains("wrong, was 5"));
        assert!(text.ends_with("1 of 2 correct"));
    }

    #[test]
    fn missing_guesses_count_as_zero() {
        let guesses: Vec<Guess> = vec!["triangle=0".parse().expect("valid guess")];
        let summary = Summary::new(&catalog(), &counts(0, 0), &guesses).expect("known element");
        assert_eq!(summary.correct(), 2);
    }

    #[test]
    fn summary_without_guesses_lists_counts() {
        let summary = Summary::new(&catalog(), &counts(2, 1), &[]).expect("no guesses");
        assert_eq!(summary.correct(), 0);
        assert!(!summary.to_string().contains("correct"));
    }

    #[test]
    fn rejects_unknown_and_duplicate_elements() {
        let unknown: Vec<Guess> = vec!["octagon=1".parse().expect("valid guess")];
        assert_eq!(
            Summary::new(&catalog(), &counts(0, 0), &unknown),
            Err(GuessError::UnknownElement("octagon".to_owned()))
        );

        let duplicate: Vec<Guess> = vec![
            "square=1".parse().expect("valid guess"),
            "type0=2".parse().expect("valid guess"),
        ];
        assert_eq!(
            Summary::new(&catalog(), &counts(0, 0), &duplicate),
            Err(GuessError::DuplicateElement("type0".to_owned()))
        );
    }
}
