//! Fold extracted fields into an ordered schema.

use crate::schema::{Extracted, TypeTag};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_EXAMPLE_CAP: usize = 5;
pub const DEFAULT_DISTINCT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Maximum number of example values kept per field.
    pub example_cap: usize,
    /// Distinct values tracked per field before the count saturates.
    pub distinct_limit: usize,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            example_cap: DEFAULT_EXAMPLE_CAP,
            distinct_limit: DEFAULT_DISTINCT_LIMIT,
        }
    }
}

/// Rough size of a field's value space, relative to how often it was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardinalityClass {
    Constant,
    Low,
    Medium,
    High,
    Unique,
}

impl CardinalityClass {
    /// At most one value is constant, up to 5 low, up to 50 medium; above
    /// that, fields where 90% of observations differ are unique.
    pub fn of(cardinality: usize, occurrences: usize) -> Self {
        match cardinality {
            0 | 1 => CardinalityClass::Constant,
            2..=5 => CardinalityClass::Low,
            6..=50 => CardinalityClass::Medium,
            _ if cardinality * 10 >= occurrences * 9 => CardinalityClass::Unique,
            _ => CardinalityClass::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardinalityClass::Constant => "constant",
            CardinalityClass::Low => "low",
            CardinalityClass::Medium => "medium",
            CardinalityClass::High => "high",
            CardinalityClass::Unique => "unique",
        }
    }
}

/// Range of the numeric values of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    #[serde(skip)]
    sum: f64,
}

impl NumericStats {
    fn first(v: f64) -> Self {
        Self {
            count: 1,
            min: v,
            max: v,
            mean: v,
            sum: v,
        }
    }

    fn record(&mut self, v: f64) {
        self.count += 1;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.sum += v;
        self.mean = self.sum / self.count as f64;
    }
}

/// Everything observed about one top-level field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldObservation {
    pub name: String,
    pub types: BTreeSet<TypeTag>,
    /// First distinct values seen, in arrival order.
    pub examples: Vec<Value>,
    /// Lines in which the field appeared.
    pub occurrences: usize,
    /// Number of distinct values, exact unless `cardinality_saturated`.
    pub cardinality: usize,
    pub cardinality_saturated: bool,
    pub cardinality_class: CardinalityClass,
    /// Present once a numeric value was seen.
    pub numeric: Option<NumericStats>,
    /// String observations, and how many of them were whole timestamps.
    pub string_values: usize,
    pub timestamp_strings: usize,

    #[serde(skip)]
    distinct: BTreeSet<String>,
}

impl FieldObservation {
    fn new(name: String) -> Self {
        Self {
            name,
            types: BTreeSet::new(),
            examples: Vec::new(),
            occurrences: 0,
            cardinality: 0,
            cardinality_saturated: false,
            cardinality_class: CardinalityClass::Constant,
            numeric: None,
            string_values: 0,
            timestamp_strings: 0,
            distinct: BTreeSet::new(),
        }
    }

    fn observe(&mut self, tag: TypeTag, value: Value, timestamp: bool, opts: &SchemaOptions) {
        self.occurrences += 1;
        self.types.insert(tag);

        if !self.cardinality_saturated {
            // Canonical JSON keeps 200 and "200" apart.
            if self.distinct.insert(value.to_string()) {
                self.cardinality = self.distinct.len();
            }
            if self.distinct.len() >= opts.distinct_limit {
                self.cardinality_saturated = true;
                self.distinct.clear();
            }
        }
        self.cardinality_class = CardinalityClass::of(self.cardinality, self.occurrences);

        if tag.is_numeric() {
            if let Some(v) = value.as_f64() {
                match &mut self.numeric {
                    Some(stats) => stats.record(v),
                    None => self.numeric = Some(NumericStats::first(v)),
                }
            }
        } else if tag == TypeTag::String {
            self.string_values += 1;
            if timestamp {
                self.timestamp_strings += 1;
            }
        }

        if self.examples.len() < opts.example_cap && !self.examples.contains(&value) {
            self.examples.push(value);
        }
    }

    /// Tags other than `null`.
    pub fn value_types(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.types.iter().copied().filter(|t| *t != TypeTag::Null)
    }

    /// True when every non-null observation was a number.
    pub fn is_numeric(&self) -> bool {
        let mut any = false;
        for t in self.value_types() {
            if !t.is_numeric() {
                return false;
            }
            any = true;
        }
        any
    }

    /// True when every non-null observation was a string.
    pub fn is_string(&self) -> bool {
        let mut tags = self.value_types().peekable();
        tags.peek().is_some() && tags.all(|t| t == TypeTag::String)
    }

    /// A string field where at least 80% of the values were timestamps.
    pub fn is_timestamp_string(&self) -> bool {
        self.is_string()
            && self.string_values > 0
            && self.timestamp_strings * 5 >= self.string_values * 4
    }

    /// `integer|string` style summary for display.
    pub fn type_summary(&self) -> String {
        self.types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Fields keyed by name, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    fields: Vec<FieldObservation>,

    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    opts: SchemaOptions,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(SchemaOptions::default())
    }
}

impl Schema {
    pub fn new(opts: SchemaOptions) -> Self {
        Self {
            fields: Vec::new(),
            index: HashMap::new(),
            opts,
        }
    }

    /// Merge one extracted value. New names are appended; known names only
    /// gain tags and examples.
    pub fn observe(&mut self, extracted: Extracted) {
        self.observe_with(extracted, |_| false);
    }

    /// Like `observe`, with `is_timestamp` judging string values.
    pub fn observe_with<F: Fn(&str) -> bool>(&mut self, extracted: Extracted, is_timestamp: F) {
        let Extracted { name, tag, value } = extracted;
        let timestamp = value.as_str().is_some_and(|s| is_timestamp(s));
        let slot = match self.index.get(&name) {
            Some(&i) => i,
            None => {
                let i = self.fields.len();
                self.index.insert(name.clone(), i);
                self.fields.push(FieldObservation::new(name));
                i
            }
        };
        self.fields[slot].observe(tag, value, timestamp, &self.opts);
    }

    pub fn observe_all<I: IntoIterator<Item = Extracted>>(&mut self, items: I) {
        for item in items {
            self.observe(item);
        }
    }

    pub fn observe_all_with<I, F>(&mut self, items: I, is_timestamp: F)
    where
        I: IntoIterator<Item = Extracted>,
        F: Fn(&str) -> bool,
    {
        for item in items {
            self.observe_with(item, &is_timestamp);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldObservation> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn fields(&self) -> &[FieldObservation] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
