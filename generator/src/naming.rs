use std::collections::{HashMap, HashSet};

use heck::ToPascalCase;

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// `core::array::Span::<core::felt252>` becomes `SpanFelt252`.
fn short_name(name: &str) -> String {
    let (base, args) = match name.find("::<") {
        Some(i) => (&name[..i], &name[i + 3..]),
        None => (name, ""),
    };
    let mut short = last_segment(base).to_pascal_case();
    for arg in args
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == ':' || c == '_'))
        .filter(|arg| !arg.is_empty())
    {
        short.push_str(&last_segment(arg).to_pascal_case());
    }
    short
}

/// `example::a::Point` becomes `ExampleAPoint`.
fn full_name(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_pascal_case())
        .collect()
}

/// Assigns every declared type name a unique PascalCase name.
///
/// The last path segment is used when no other declaration shares it, the whole path otherwise.
#[derive(Debug, Default)]
pub struct TypeNamer {
    names: HashMap<String, String>,
}

impl TypeNamer {
    pub fn new<'a>(declared: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen = HashSet::new();
        let declared: Vec<&str> = declared
            .into_iter()
            .filter(|name| seen.insert(*name))
            .collect();

        let mut short_counts: HashMap<String, usize> = HashMap::new();
        for name in &declared {
            *short_counts.entry(short_name(name)).or_default() += 1;
        }

        let mut names = HashMap::new();
        let mut taken: HashMap<String, usize> = HashMap::new();
        for name in declared {
            let short = short_name(name);
            let mut candidate = if short_counts[&short] == 1 {
                short
            } else {
                full_name(name)
            };
            let uses = taken.entry(candidate.clone()).or_default();
            *uses += 1;
            if *uses > 1 {
                candidate = format!("{candidate}{uses}");
            }
            names.insert(name.to_string(), candidate);
        }
        Self { names }
    }

    pub fn get(&self, declared: &str) -> Option<&str> {
        self.names.get(declared).map(String::as_str)
    }
}
