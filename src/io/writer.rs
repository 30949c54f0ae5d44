use std::io::Write;

use crate::domain::{
    cart::Cart,
    member::FamilyMember,
    summary::{CategoryBreakdown, Summary},
    transaction::Transaction,
};

#[derive(serde::Serialize)]
/// Internal CSV row for the transaction export.
///
/// Headers written (in this order): `id,date,type,category,description,amount,member`.
struct TransactionRow<'a> {
    id: u64,
    date: String,
    #[serde(rename = "type")]
    tx_type: String,
    category: &'a str,
    description: &'a str,
    amount: String,
    member: &'a str,
}

#[derive(serde::Serialize)]
struct MemberRow<'a> {
    name: &'a str,
    role: &'a str,
    spending_limit: String,
    total_spent: String,
    spent_pct: String,
}

#[derive(serde::Serialize)]
struct CartRow<'a> {
    product_id: &'a str,
    name: &'a str,
    unit_price: String,
    quantity: u64,
    line_total: String,
}

#[derive(serde::Serialize)]
struct MetricRow {
    metric: String,
    amount: String,
}

/// Writes transactions in ledger order (most recent first). The `member`
/// column carries the member's name, looked up in `members`.
///
/// Monetary fields are formatted with exactly 2 decimal places.
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
pub fn write_transactions<W: Write>(
    writer: W,
    transactions: &[Transaction],
    members: &[FamilyMember],
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for tx in transactions {
        let member = tx
            .member_id
            .and_then(|id| members.iter().find(|m| m.id == id))
            .map(|m| m.name.as_str())
            .unwrap_or("");
        wtr.serialize(TransactionRow {
            id: tx.id,
            date: tx.date.format("%Y-%m-%d").to_string(),
            tx_type: tx.tx_type.to_string(),
            category: tx.category.as_str(),
            description: &tx.description,
            amount: tx.amount.to_string_2dp(),
            member,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the roster with headers `name,role,spending_limit,total_spent,spent_pct`.
///
/// # Examples
///
/// ```
/// use ledger_core::io::writer::write_members;
/// use ledger_core::domain::member::{FamilyMember, Role};
/// use ledger_core::common::money::Money;
///
/// let members = vec![FamilyMember {
///     id: 1,
///     name: "Ada".into(),
///     role: Role::Teen,
///     spending_limit: Money::from_units(1000),
///     total_spent: Money::from_units(550),
/// }];
///
/// let mut out = Vec::new();
/// write_members(&mut out, &members).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert_eq!(s, "name,role,spending_limit,total_spent,spent_pct\nAda,teen,1000.00,550.00,55.0\n");
/// ```
pub fn write_members<W: Write>(writer: W, members: &[FamilyMember]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for m in members {
        wtr.serialize(MemberRow {
            name: &m.name,
            role: m.role.as_str(),
            spending_limit: m.spending_limit.to_string_2dp(),
            total_spent: m.total_spent.to_string_2dp(),
            spent_pct: format!("{:.1}", m.spending_percentage()),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per cart line followed by a `total` row holding the unit
/// count and the cart total.
pub fn write_cart<W: Write>(writer: W, cart: &Cart) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for line in cart.items() {
        wtr.serialize(CartRow {
            product_id: &line.product.id,
            name: &line.product.name,
            unit_price: line.product.price.to_string_2dp(),
            quantity: u64::from(line.quantity),
            line_total: line.line_total().to_string_2dp(),
        })?;
    }
    wtr.serialize(CartRow {
        product_id: "",
        name: "total",
        unit_price: String::new(),
        quantity: cart.item_count(),
        line_total: cart.total().to_string_2dp(),
    })?;

    wtr.flush()?;
    Ok(())
}

/// Writes `metric,amount` rows: income, expenses, balance, then one
/// `expense:<category>` row per expense category in display order.
pub fn write_summary<W: Write>(
    writer: W,
    summary: &Summary,
    breakdown: &CategoryBreakdown,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    let totals = [
        ("income", summary.income),
        ("expenses", summary.expenses),
        ("balance", summary.balance),
    ];
    for (metric, amount) in totals {
        wtr.serialize(MetricRow {
            metric: metric.to_string(),
            amount: amount.to_string_2dp(),
        })?;
    }
    for (category, amount) in breakdown.entries() {
        wtr.serialize(MetricRow {
            metric: format!("expense:{category}"),
            amount: amount.to_string_2dp(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
