use crate::{common::event::LedgerEvent, domain::transaction::TxType};
use std::io::Read;

#[derive(serde::Deserialize)]
/// Internal CSV row for transaction imports. `member` is blank for income
/// and for personal ledgers.
struct TransactionRow {
    #[serde(rename = "type")]
    tx_type: String,
    description: String,
    amount: String,
    category: String,
    #[serde(default)]
    member: Option<String>,
}

#[derive(serde::Deserialize)]
struct MemberRow {
    name: String,
    role: String,
    limit: String,
}

/// Reads transaction rows from a CSV reader.
///
/// Supported headers: `type,description,amount,category,member`.
/// `type` is case-insensitive and must be `income` or `expense`. Field
/// validation (amounts, categories, members) is left to the ledger.
///
/// # Examples
///
/// ```
/// use ledger_core::io::reader::read_transactions;
/// use ledger_core::common::event::LedgerEvent;
/// use csv::ReaderBuilder;
///
/// let data = "type,description,amount,category,member\n\
/// income,March pay,500,salary,\n\
/// expense,Groceries,120,food,Ada\n";
/// let mut rdr = ReaderBuilder::new().from_reader(data.as_bytes());
/// let events: Vec<_> = read_transactions(&mut rdr).collect();
///
/// assert!(matches!(&events[0], Ok(LedgerEvent::AddTransaction { member: None, .. })));
/// assert!(matches!(&events[1], Ok(LedgerEvent::AddTransaction { member: Some(m), .. }) if m == "Ada"));
/// ```
pub fn read_transactions<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<LedgerEvent, String>> + '_ {
    rdr.deserialize::<TransactionRow>()
        .enumerate()
        .map(|(i, res)| {
            let line = i + 2;
            let row = res.map_err(|e| e.to_string())?;
            let tx_type = match row.tx_type.trim().to_ascii_lowercase().as_str() {
                "income" => TxType::Income,
                "expense" => TxType::Expense,
                other => {
                    return Err(format!(
                        "unknown transaction type: {other} on line {line}"
                    ));
                }
            };
            let member = row
                .member
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty());

            Ok(LedgerEvent::AddTransaction {
                tx_type,
                description: row.description,
                amount: row.amount,
                category: row.category,
                member,
            })
        })
}

/// Reads member rows with headers `name,role,limit`.
pub fn read_members<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<LedgerEvent, String>> + '_ {
    rdr.deserialize::<MemberRow>().map(|res| {
        let row = res.map_err(|e| e.to_string())?;
        Ok(LedgerEvent::AddMember {
            name: row.name,
            role: row.role,
            limit: row.limit,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    // Helper: parse CSV input into collected events for assertions.
    fn collect_events(input: &str) -> Vec<Result<LedgerEvent, String>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());
        read_transactions(&mut reader).collect()
    }

    #[test]
    fn parses_income_and_expense_rows() {
        let data = "type,description,amount,category,member\n\
INCOME,pay,500,salary,\nexpense,lunch,12.50,food,Ada\n";
        let events = collect_events(data);

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Ok(LedgerEvent::AddTransaction {
                tx_type: TxType::Income,
                description: "pay".into(),
                amount: "500".into(),
                category: "salary".into(),
                member: None,
            })
        );
        assert_eq!(
            events[1],
            Ok(LedgerEvent::AddTransaction {
                tx_type: TxType::Expense,
                description: "lunch".into(),
                amount: "12.50".into(),
                category: "food".into(),
                member: Some("Ada".into()),
            })
        );
    }

    #[test]
    fn keeps_invalid_fields_for_the_ledger_to_reject() {
        let data = "type,description,amount,category,member\nexpense,,abc,food,\n";
        let events = collect_events(data);
        assert!(matches!(
            &events[0],
            Ok(LedgerEvent::AddTransaction { description, amount, .. })
                if description.is_empty() && amount == "abc"
        ));
    }

    #[test]
    fn reports_unknown_type_with_line_number() {
        let data = "type,description,amount,category,member\nincome,a,1,salary,\nrefund,b,2,food,\n";
        let events = collect_events(data);

        assert_eq!(events.len(), 2);
        let err = events.into_iter().nth(1).unwrap().unwrap_err();
        assert_eq!(err, "unknown transaction type: refund on line 3");
    }

    #[test]
    fn parses_member_rows() {
        let data = "name,role,limit\nAda,teen,1000\nBo,child,50\n";
        let mut reader = csv::ReaderBuilder::new().from_reader(data.as_bytes());
        let events: Vec<_> = read_members(&mut reader).collect();

        assert_eq!(
            events,
            vec![
                Ok(LedgerEvent::AddMember {
                    name: "Ada".into(),
                    role: "teen".into(),
                    limit: "1000".into(),
                }),
                Ok(LedgerEvent::AddMember {
                    name: "Bo".into(),
                    role: "child".into(),
                    limit: "50".into(),
                }),
            ]
        );
    }
}
