// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::ledger::ExpenseLedger;
use crate::models::{
    Breach, BreachState, BudgetPolicy, CategoryBudget, Period, Severity, Status, Transaction,
};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendguard", "spendguard"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("spendguard.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS policy_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        department TEXT NOT NULL,
        category TEXT NOT NULL,
        limit_amount TEXT NOT NULL,
        period TEXT NOT NULL DEFAULT 'monthly' CHECK(period IN ('monthly','annual')),
        UNIQUE(department, category)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        ts TEXT NOT NULL,
        amount TEXT NOT NULL,
        department TEXT NOT NULL,
        category TEXT NOT NULL,
        vendor TEXT NOT NULL,
        description TEXT NOT NULL,
        matched INTEGER NOT NULL DEFAULT 0,
        status TEXT,
        usage_percent TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_ts ON transactions(ts);

    -- Operational breach log. Survives policy reloads; feeds recurrence
    -- counting across process restarts.
    CREATE TABLE IF NOT EXISTS breaches(
        id TEXT PRIMARY KEY,
        run_id TEXT NOT NULL,
        detected_at TEXT NOT NULL,
        department TEXT NOT NULL,
        category TEXT NOT NULL,
        limit_amount TEXT NOT NULL,
        spent TEXT NOT NULL,
        overage TEXT NOT NULL,
        usage_percent TEXT NOT NULL,
        overage_percent TEXT NOT NULL,
        severity TEXT NOT NULL,
        recurrence_count INTEGER NOT NULL,
        linked_transactions TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_breaches_run ON breaches(run_id);
    "#,
    )?;
    Ok(())
}

/// Replaces the stored policy and wipes transaction history; a policy swap
/// is a full ledger reset. The breach log is deliberately left alone.
pub fn save_policy(conn: &mut Connection, policy: &BudgetPolicy) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM policy_categories", [])?;
    tx.execute("DELETE FROM transactions", [])?;
    for (dept, cat, budget) in policy.iter_categories() {
        tx.execute(
            "INSERT INTO policy_categories(department, category, limit_amount, period) \
             VALUES (?1, ?2, ?3, ?4)",
            params![dept, cat, budget.limit.to_string(), budget.period.as_str()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn load_policy(conn: &Connection) -> Result<Option<BudgetPolicy>> {
    let mut stmt = conn.prepare(
        "SELECT department, category, limit_amount, period FROM policy_categories \
         ORDER BY department, category",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;

    let mut policy = BudgetPolicy::default();
    for row in rows {
        let (dept, cat, limit_raw, period_raw) = row?;
        let limit = parse_decimal_col(&limit_raw, "limit_amount")?;
        let period = match period_raw.as_str() {
            "annual" => Period::Annual,
            _ => Period::Monthly,
        };
        policy.insert(&dept, &cat, CategoryBudget { limit, period });
    }
    if policy.is_empty() {
        return Ok(None);
    }
    Ok(Some(policy))
}

/// Drops the policy and all transactions, keeping the breach log.
pub fn reset_policy(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM policy_categories", [])?;
    tx.execute("DELETE FROM transactions", [])?;
    tx.commit()?;
    Ok(())
}

pub fn insert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, ts, amount, department, category, vendor, description, \
         matched, status, usage_percent) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            t.id.to_string(),
            t.timestamp.to_rfc3339(),
            t.amount.to_string(),
            t.department,
            t.category,
            t.vendor,
            t.description,
            t.matched as i64,
            t.status.map(|s| s.as_str()),
            t.usage_percent.map(|p| p.to_string()),
        ],
    )?;
    Ok(())
}

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, ts, amount, department, category, vendor, description, matched, status, \
         usage_percent FROM transactions ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, i64>(7)?,
            r.get::<_, Option<String>>(8)?,
            r.get::<_, Option<String>>(9)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, ts, amount, department, category, vendor, description, matched, status, pct) =
            row?;
        out.push(Transaction {
            id: parse_uuid_col(&id)?,
            timestamp: parse_ts_col(&ts)?,
            amount: parse_decimal_col(&amount, "amount")?,
            department,
            category,
            vendor,
            description,
            matched: matched != 0,
            status: status.as_deref().map(parse_status).transpose()?,
            usage_percent: pct
                .as_deref()
                .map(|p| parse_decimal_col(p, "usage_percent"))
                .transpose()?,
        });
    }
    Ok(out)
}

/// Rebuilds the in-memory ledger from the stored policy and transactions.
pub fn load_ledger(conn: &Connection) -> Result<ExpenseLedger> {
    let policy = load_policy(conn)?;
    let transactions = load_transactions(conn)?;
    Ok(ExpenseLedger::restore(policy, transactions))
}

/// Appends one detection run's breaches under a shared run id.
pub fn insert_breaches(conn: &mut Connection, run_id: Uuid, breaches: &[Breach]) -> Result<()> {
    let tx = conn.transaction()?;
    for b in breaches {
        tx.execute(
            "INSERT INTO breaches(id, run_id, detected_at, department, category, limit_amount, \
             spent, overage, usage_percent, overage_percent, severity, recurrence_count, \
             linked_transactions) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                b.id.to_string(),
                run_id.to_string(),
                b.detected_at.to_rfc3339(),
                b.department,
                b.category,
                b.limit.to_string(),
                b.spent.to_string(),
                b.overage.to_string(),
                b.usage_percent.to_string(),
                b.overage_percent.to_string(),
                b.severity.as_str(),
                b.recurrence_count as i64,
                serde_json::to_string(&b.linked_transactions)?,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn load_breach_history(conn: &Connection) -> Result<Vec<Breach>> {
    breach_query(conn, "ORDER BY rowid", &[])
}

/// The breaches recorded by the most recent detection run, if any.
pub fn latest_breach_run(conn: &Connection) -> Result<Vec<Breach>> {
    let run_id: Option<String> = conn
        .query_row(
            "SELECT run_id FROM breaches ORDER BY rowid DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    match run_id {
        Some(id) => breach_query(conn, "WHERE run_id = ?1 ORDER BY rowid", &[&id]),
        None => Ok(Vec::new()),
    }
}

fn breach_query(
    conn: &Connection,
    tail: &str,
    bind: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Breach>> {
    let sql = format!(
        "SELECT id, detected_at, department, category, limit_amount, spent, overage, \
         usage_percent, overage_percent, severity, recurrence_count, linked_transactions \
         FROM breaches {tail}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(bind, |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(08)?,
            r.get::<_, String>(9)?,
            r.get::<_, i64>(10)?,
            r.get::<_, String>(11)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (
            id,
            detected_at,
            department,
            category,
            limit_raw,
            spent,
            overage,
            usage_pct,
            overage_pct,
            severity,
            recurrence,
            linked,
        ) = row?;
        let recurrence_count = u32::try_from(recurrence).unwrap_or(0);
        out.push(Breach {
            id: parse_uuid_col(&id)?,
            department,
            category,
            limit: parse_decimal_col(&limit_raw, "limit_amount")?,
            spent: parse_decimal_col(&spent, "spent")?,
            overage: parse_decimal_col(&overage, "overage")?,
            usage_percent: parse_decimal_col(&usage_pct, "usage_percent")?,
            overage_percent: parse_decimal_col(&overage_pct, "overage_percent")?,
            severity: parse_severity(&severity)?,
            detected_at: parse_ts_col(&detected_at)?,
            state: BreachState::Active,
            recurrence_count,
            is_recurring: recurrence_count > 0,
            linked_transactions: serde_json::from_str(&linked)
                .with_context(|| format!("Invalid linked transaction list for breach {id}"))?,
        });
    }
    Ok(out)
}

fn parse_decimal_col(raw: &str, col: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid {col} value '{raw}' in store"))
}

fn parse_uuid_col(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid id '{raw}' in store"))
}

fn parse_ts_col(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp '{raw}' in store"))?
        .with_timezone(&Utc))
}

fn parse_status(raw: &str) -> Result<Status> {
    match raw {
        "Safe" => Ok(Status::Safe),
        "Approaching" => Ok(Status::Approaching),
        "Exceeded" => Ok(Status::Exceeded),
        other => Err(anyhow!("Unknown status '{other}' in store")),
    }
}

fn parse_severity(raw: &str) -> Result<Severity> {
    match raw {
        "Low" => Ok(Severity::Low),
        "Medium" => Ok(Severity::Medium),
        "High" => Ok(Severity::High),
        "Critical" => Ok(Severity::Critical),
        other => Err(anyhow!("Unknown severity '{other}' in store")),
    }
}
