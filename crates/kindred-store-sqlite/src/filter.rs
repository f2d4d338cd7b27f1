//! Translation of a [`Predicate`] into an SQL `WHERE` clause.
//!
//! Parameters are positional (`?`) and collected in the order they appear in
//! the clause. Text matching goes through [`FOLD_FUNCTION`], registered on
//! the connection by the store, so that it folds case the same way the
//! in-process evaluator does. The presence snapshot is bound as a single JSON
//! array, keeping the parameter count independent of how many members are
//! online.

use kindred_core::{
  criteria::Bounds,
  predicate::{CodeField, NumericField, Predicate, TextField},
};
use rusqlite::types::Value;

use crate::encode::encode_uuid;

/// Name of the Unicode lowercase SQL function the clause relies on.
pub const FOLD_FUNCTION: &str = "kindred_fold";

/// A `WHERE` clause body with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
  pub clause: String,
  pub params: Vec<Value>,
}

pub fn where_clause(predicate: &Predicate) -> SqlFilter {
  let mut params = Vec::new();
  let clause = render(predicate, &mut params);
  SqlFilter { clause, params }
}

fn text_column(field: TextField) -> &'static str {
  match field {
    TextField::FirstName => "first_name",
    TextField::LastName => "last_name",
    TextField::Username => "username",
  }
}

fn numeric_column(field: NumericField) -> &'static str {
  match field {
    NumericField::Height => "height",
    NumericField::Weight => "weight",
  }
}

fn code_column(field: CodeField) -> &'static str {
  match field {
    CodeField::HairColor => "hair_color",
    CodeField::EyeColor => "eye_color",
    CodeField::Religion => "religion",
    CodeField::MaritalStatus => "marital_status",
    CodeField::Smoking => "smoking",
    CodeField::Drinking => "drinking",
    CodeField::Languages => "languages",
  }
}

fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

fn join(children: &[Predicate], op: &str, empty: &str, params: &mut Vec<Value>) -> String {
  if children.is_empty() {
    return empty.to_owned();
  }
  let parts: Vec<String> = children.iter().map(|c| render(c, params)).collect();
  format!("({})", parts.join(op))
}

fn range(column: &str, bounds: &Bounds, params: &mut Vec<Value>) -> String {
  let mut parts = Vec::new();
  if let Some(min) = bounds.min {
    parts.push(format!("{column} >= ?"));
    params.push(Value::Integer(min));
  }
  if let Some(max) = bounds.max {
    parts.push(format!("{column} <= ?"));
    params.push(Value::Integer(max));
  }
  if parts.is_empty() {
    // No bounds still requires a stored value, as in the in-process evaluator.
    return format!("{column} IS NOT NULL");
  }
  format!("({})", parts.join(" AND "))
}

fn render(predicate: &Predicate, params: &mut Vec<Value>) -> String {
  match predicate {
    Predicate::And(children) => join(children, " AND ", "1", params),
    Predicate::Or(children) => join(children, " OR ", "0", params),
    Predicate::NotProfile(id) => {
      params.push(Value::Text(encode_uuid(*id)));
      "profile_id != ?".to_owned()
    }
    Predicate::TextContains { field, needle } => {
      params.push(Value::Text(needle.clone()));
      format!("instr({FOLD_FUNCTION}({}), ?) > 0", text_column(*field))
    }
    Predicate::HasPhotos => "json_array_length(photos) > 0".to_owned(),
    Predicate::CountryIs(country) => {
      params.push(Value::Text(country.clone()));
      "country = ?".to_owned()
    }
    Predicate::RegionIs(region) => {
      params.push(Value::Integer(*region));
      "region = ?".to_owned()
    }
    Predicate::CityIs(city) => {
      params.push(Value::Integer(*city));
      "city = ?".to_owned()
    }
    Predicate::InRange { field, bounds } => range(numeric_column(*field), bounds, params),
    Predicate::CodeIn { codes, .. } if codes.is_empty() => "0".to_owned(),
    Predicate::CodeIn { field, codes } => {
      params.extend(codes.iter().copied().map(Value::Integer));
      let set = placeholders(codes.len());
      let column = code_column(*field);
      if field.is_multi_valued() {
        format!("EXISTS (SELECT 1 FROM json_each(profiles.{column}) AS j WHERE j.value IN ({set}))")
      } else {
        format!("{column} IN ({set})")
      }
    }
    Predicate::UsernameIn(usernames) if usernames.is_empty() => "0".to_owned(),
    Predicate::UsernameIn(usernames) => {
      let list: Vec<serde_json::Value> =
        usernames.iter().cloned().map(serde_json::Value::String).collect();
      params.push(Value::Text(serde_json::Value::Array(list).to_string()));
      "username IN (SELECT value FROM json_each(?))".to_owned()
    }
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn empty_and_is_true() {
    let f = where_clause(&Predicate::And(vec![]));
    assert_eq!(f.clause, "1");
    assert!(f.params.is_empty());
  }

  #[test]
  fn nested_or_inside_and() {
    let id = Uuid::new_v4();
    let f = where_clause(&Predicate::And(vec![
      Predicate::NotProfile(id),
      Predicate::Or(vec![
        Predicate::TextContains { field: TextField::FirstName, needle: "an".into() },
        Predicate::TextContains { field: TextField::Username, needle: "an".into() },
      ]),
    ]));
    assert_eq!(
      f.clause,
      "(profile_id != ? AND (instr(kindred_fold(first_name), ?) > 0 OR instr(kindred_fold(username), ?) > 0))"
    );
    assert_eq!(f.params, vec![
      Value::Text(encode_uuid(id)),
      Value::Text("an".into()),
      Value::Text("an".into()),
    ]);
  }

  #[test]
  fn one_sided_range() {
    let f = where_clause(&Predicate::InRange {
      field:  NumericField::Weight,
      bounds: Bounds { min: None, max: Some(80) },
    });
    assert_eq!(f.clause, "(weight <= ?)");
    assert_eq!(f.params, vec![Value::Integer(80)]);
  }

  #[test]
  fn code_sets() {
    let scalar = where_clause(&Predicate::CodeIn { field: CodeField::Smoking, codes: vec![1, 2] });
    assert_eq!(scalar.clause, "smoking IN (?, ?)");

    let multi = where_clause(&Predicate::CodeIn { field: CodeField::Languages, codes: vec![3] });
    assert!(multi.clause.starts_with("EXISTS (SELECT 1 FROM json_each(profiles.languages)"));
    assert_eq!(multi.params, vec![Value::Integer(3)]);
  }

  #[test]
  fn username_set_binds_one_json_parameter() {
    let names = (0..50_000).map(|i| format!("user{i}")).collect();
    let f = where_clause(&Predicate::UsernameIn(names));
    assert_eq!(f.clause, "username IN (SELECT value FROM json_each(?))");
    assert_eq!(f.params.len(), 1);
  }

  #[test]
  fn empty_username_set_matches_nothing() {
    let f = where_clause(&Predicate::UsernameIn(Default::default()));
    assert_eq!(f.clause, "0");
  }
}
