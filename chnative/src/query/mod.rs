use crate::{ChNativeError, Result, ToSql, Value};

pub mod select;

pub struct ParsedQuery(pub(crate) String);

/// Truncates an `INSERT INTO t VALUES (...)`-shaped query to its `INSERT INTO t` prefix and
/// ensures it ends in ` VALUES`, matching the native-format batch-insert flow's expectation
/// that it drive the header round-trip and the data block itself, not a literal values list.
///
/// Mirrors `splitInsertRe.Split(query, -1)[0]` followed by the `VALUES`-suffix check: find the
/// first whitespace-`VALUES`-whitespace*-`(` occurrence (case-insensitive) and cut there; if no
/// such occurrence exists, or what remains doesn't already end in `VALUES`, append ` VALUES` —
/// unless the query already carries an explicit `FORMAT` clause (e.g. `FORMAT Native`), which
/// names the wire format for the batch itself and would conflict with a trailing `VALUES`.
pub(crate) fn normalize_insert_query(query: ParsedQuery) -> ParsedQuery {
    let query = query.0;
    let upper = query.to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let mut cut = None;
    for i in 0..bytes.len() {
        if !bytes[i].is_ascii_whitespace() {
            continue;
        }
        let rest = &upper[i + 1..];
        if !rest.starts_with("VALUES") {
            continue;
        }
        let mut j = i + 1 + "VALUES".len();
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'(' {
            cut = Some(i);
            break;
        }
    }

    let mut head = match cut {
        Some(cut) => query[..cut].to_string(),
        None => query,
    };
    let trimmed_upper = head.trim_end().to_ascii_uppercase();
    let has_format_clause = trimmed_upper.split_ascii_whitespace().any(|tok| tok == "FORMAT");
    if !trimmed_upper.ends_with("VALUES") && !has_format_clause {
        head.push_str(" VALUES");
    }
    ParsedQuery(head)
}

impl TryInto<ParsedQuery> for String {
    type Error = ChNativeError;

    fn try_into(self) -> Result<ParsedQuery> {
        Ok(ParsedQuery(self))
    }
}

impl<'a> TryInto<ParsedQuery> for &'a str {
    type Error = ChNativeError;

    fn try_into(self) -> Result<ParsedQuery> {
        Ok(ParsedQuery(self.to_string()))
    }
}

impl<'a> TryInto<ParsedQuery> for &'a String {
    type Error = ChNativeError;

    fn try_into(self) -> Result<ParsedQuery> {
        Ok(ParsedQuery(self.clone()))
    }
}

pub struct QueryBuilder<'a> {
    base: &'a str,
    arguments: Vec<Result<Value>>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            base: query,
            arguments: vec![],
        }
    }

    pub fn arg(mut self, arg: impl ToSql) -> Self {
        self.arguments.push(arg.to_sql(None));
        self
    }

    pub fn args<A: ToSql>(mut self, args: impl IntoIterator<Item = A>) -> Self {
        self.arguments
            .extend(args.into_iter().map(|arg| arg.to_sql(None)));
        self
    }
}

impl<'a> TryInto<ParsedQuery> for QueryBuilder<'a> {
    type Error = ChNativeError;

    fn try_into(self) -> Result<ParsedQuery> {
        let arguments = self.arguments.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(ParsedQuery(crate::query_parser::parse_query_arguments(
            self.base,
            &arguments[..],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(query: &str) -> String {
        normalize_insert_query(ParsedQuery(query.to_string())).0
    }

    #[test]
    fn strips_values_tail_and_keeps_values_suffix() {
        assert_eq!(
            normalize("INSERT INTO t (a, b) VALUES (1, 2), (3, 4)"),
            "INSERT INTO t (a, b) VALUES"
        );
        assert_eq!(
            normalize("insert into t (a, b) values (1, 2)"),
            "insert into t (a, b) VALUES"
        );
    }

    #[test]
    fn appends_values_when_absent() {
        assert_eq!(normalize("INSERT INTO t"), "INSERT INTO t VALUES");
        assert_eq!(normalize("INSERT INTO t VALUES"), "INSERT INTO t VALUES");
    }

    #[test]
    fn leaves_explicit_format_clause_alone() {
        assert_eq!(
            normalize("INSERT INTO t FORMAT Native"),
            "INSERT INTO t FORMAT Native"
        );
        assert_eq!(
            normalize("insert into t format native"),
            "insert into t format native"
        );
    }
}
