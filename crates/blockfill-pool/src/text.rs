//! Line-oriented snapshot format.
//!
//! One transaction per line, whitespace separated:
//!
//! ```text
//! # id   fee   weight  depends...
//! aa     1200  560
//! bb     300   880     aa
//! ```
//!
//! Lines whose first field starts with `#` and lines with fewer than two
//! fields are skipped. Only `depends` is stored; `spent_by` is derived.

use std::collections::HashMap;
use std::io::{self, Write};

use blockfill_core::{Pool, Tx};
use tracing::debug;

use crate::error::PoolError;

/// Parse a text snapshot.
///
/// # Errors
///
/// - [`PoolError::Malformed`] for a row without a weight, an unparsable
///   number, a zero weight or a repeated id.
/// - [`PoolError::UnknownParent`] if a row depends on an id that has no row.
pub fn parse_text(input: &str) -> Result<Pool, PoolError> {
    let mut pool: Pool = HashMap::new();

    for (idx, line) in input.lines().enumerate() {
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 || fields[0].starts_with('#') {
            continue;
        }
        let [id, fee, weight, depends @ ..] = fields.as_slice() else {
            return Err(PoolError::malformed(lineno, "expected `id fee weight [depends...]`"));
        };

        let fee: i64 = fee
            .parse()
            .map_err(|e| PoolError::malformed(lineno, format!("fee '{fee}': {e}")))?;
        let weight: u64 = weight
            .parse()
            .map_err(|e| PoolError::malformed(lineno, format!("weight '{weight}': {e}")))?;
        if weight == 0 {
            return Err(PoolError::malformed(lineno, "weight must be positive"));
        }
        if pool.contains_key(*id) {
            return Err(PoolError::malformed(lineno, format!("duplicate id {id}")));
        }

        let mut deps: Vec<String> = Vec::with_capacity(depends.len());
        for d in depends {
            if !deps.iter().any(|p| p == d) {
                deps.push((*d).to_string());
            }
        }
        pool.insert((*id).to_string(), Tx::new(*id, fee, weight).with_depends(deps));
    }

    derive_spent_by(&mut pool)?;
    debug!(txs = pool.len(), "text snapshot parsed");
    Ok(pool)
}

/// Fill every transaction's `spent_by` from the `depends` lists.
fn derive_spent_by(pool: &mut Pool) -> Result<(), PoolError> {
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for tx in pool.values() {
        for parent in &tx.depends {
            if !pool.contains_key(parent) {
                return Err(PoolError::UnknownParent {
                    tx: tx.id.clone(),
                    parent: parent.clone(),
                });
            }
            children.entry(parent.clone()).or_default().push(tx.id.clone());
        }
    }
    for (parent, mut kids) in children {
        kids.sort_unstable();
        kids.dedup();
        if let Some(tx) = pool.get_mut(&parent) {
            tx.spent_by = kids;
        }
    }
    Ok(())
}

/// Write `pool` in the text format, one row per transaction sorted by id.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_text<W: Write>(pool: &Pool, mut out: W) -> io::Result<()> {
    let mut ids: Vec<&String> = pool.keys().collect();
    ids.sort_unstable();
    for id in ids {
        let tx = &pool[id];
        write!(out, "{} {} {}", tx.id, tx.fee, tx.weight)?;
        for d in &tx.depends {
            write!(out, " {d}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# id fee weight depends
a 10 400
b 20 400 a
c 30  800   b a

d 5 200 a
lonely
";

    #[test]
    fn parses_rows_and_derives_children() {
        let pool = parse_text(SAMPLE).expect("parse");
        assert_eq!(pool.len(), 4);

        let a = &pool["a"];
        assert_eq!((a.fee, a.weight), (10, 400));
        assert!(a.depends.is_empty());
        assert_eq!(a.spent_by, ["b", "c", "d"]);

        assert_eq!(pool["c"].depends, ["b", "a"]);
        assert_eq!(pool["b"].spent_by, ["c"]);
    }

    #[test]
    fn unknown_parent_names_the_parent() {
        let err = parse_text("a 1 4 ghost\n").expect_err("should fail");
        assert!(matches!(
            err,
            PoolError::UnknownParent { ref parent, .. } if parent == "ghost"
        ));
    }

    #[test]
    fn malformed_rows_report_their_line() {
        let err = parse_text("a 1 4\nb 1\n").expect_err("should fail");
        assert!(matches!(err, PoolError::Malformed { line: 2, .. }));

        let err = parse_text("a x 4\n").expect_err("should fail");
        assert!(err.to_string().starts_with("line 1: fee 'x'"));

        let err = parse_text("a 1 0\n").expect_err("should fail");
        assert!(matches!(err, PoolError::Malformed { line: 1, .. }));

        let err = parse_text("a 1 4\na 2 4\n").expect_err("should fail");
        assert!(err.to_string().contains("duplicate id a"));
    }

    #[test]
    fn repeated_parent_is_listed_once() {
        let pool = parse_text("a 1 4\nb 1 4 a a\n").expect("parse");
        assert_eq!(pool["b"].depends, ["a"]);
        assert_eq!(pool["a"].spent_by, ["b"]);
    }

    #[test]
    fn written_pool_reads_back_identically() {
        let pool = parse_text(SAMPLE).expect("parse");
        let mut buf = Vec::new();
        write_text(&pool, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("a 10 400\nb 20 400 a\n"));
        assert_eq!(parse_text(&text).expect("reparse"), pool);
    }
}
