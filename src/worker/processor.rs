use crate::{
    common::{error::LedgerError, event::LedgerEvent},
    domain::{
        member::NewMember,
        sink::LedgerSink,
        transaction::{NewTransaction, TxType},
    },
};

/// Counters for one import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub applied: usize,
    pub rejected: usize,
}

#[derive(Debug, Default)]
pub struct Processor {
    stats: ImportStats,
}
impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ImportStats {
        self.stats
    }

    /// Applies one event. Rows the ledger refuses are logged and counted;
    /// only storage failures abort the run.
    pub fn process<L: LedgerSink + ?Sized>(
        &mut self,
        ledger: &mut L,
        event: LedgerEvent,
    ) -> Result<(), LedgerError> {
        let result = match event {
            LedgerEvent::AddTransaction {
                tx_type,
                description,
                amount,
                category,
                member,
            } => {
                let member_id = match member {
                    Some(name) if tx_type == TxType::Expense && ledger.tracks_members() => {
                        match ledger.member_id_by_name(&name) {
                            Some(id) => Some(id),
                            None => {
                                tracing::warn!(member = %name, "import row names unknown member, skipped");
                                self.stats.rejected += 1;
                                return Ok(());
                            }
                        }
                    }
                    _ => None,
                };
                let new = NewTransaction {
                    description,
                    amount,
                    category,
                    tx_type,
                    member_id,
                };
                ledger.add_transaction(new).map(|_| true)
            }
            LedgerEvent::AddMember { name, role, limit } => ledger
                .add_member(NewMember::new(name, role, limit))
                .map(|m| m.is_some()),
        };

        match result {
            Ok(true) => self.stats.applied += 1,
            Ok(false) => {
                tracing::warn!("ledger keeps no member roster, member row skipped");
                self.stats.rejected += 1;
            }
            Err(LedgerError::Validation(e)) => {
                tracing::warn!(error = %e, "import row rejected");
                self.stats.rejected += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::money::Money,
        domain::{family::FamilyLedger, personal::PersonalLedger},
        io::store::MemoryStore,
    };

    fn expense(description: &str, amount: &str, member: Option<&str>) -> LedgerEvent {
        LedgerEvent::AddTransaction {
            tx_type: TxType::Expense,
            description: description.into(),
            amount: amount.into(),
            category: "food".into(),
            member: member.map(str::to_string),
        }
    }

    fn member(name: &str, limit: &str) -> LedgerEvent {
        LedgerEvent::AddMember {
            name: name.into(),
            role: "teen".into(),
            limit: limit.into(),
        }
    }

    #[test]
    fn family_import_resolves_members_by_name() {
        let mut ledger = FamilyLedger::open(MemoryStore::new()).unwrap();
        let mut processor = Processor::new();

        processor.process(&mut ledger, member("Ada", "1000")).unwrap();
        processor
            .process(&mut ledger, expense("lunch", "30", Some("ada")))
            .unwrap();

        assert_eq!(processor.stats(), ImportStats { applied: 2, rejected: 0 });
        assert_eq!(ledger.members()[0].total_spent, Money::from_units(30));
    }

    #[test]
    fn rejected_rows_are_counted_not_fatal() {
        let mut ledger = FamilyLedger::open(MemoryStore::new()).unwrap();
        let mut processor = Processor::new();

        processor.process(&mut ledger, member("Ada", "0")).unwrap();
        processor
            .process(&mut ledger, expense("lunch", "30", Some("Nobody")))
            .unwrap();
        processor
            .process(&mut ledger, expense("lunch", "30", None))
            .unwrap();

        assert_eq!(processor.stats(), ImportStats { applied: 0, rejected: 3 });
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn personal_import_ignores_member_column_and_skips_member_rows() {
        let mut ledger = PersonalLedger::open(MemoryStore::new()).unwrap();
        let mut processor = Processor::new();

        processor
            .process(&mut ledger, expense("lunch", "30", Some("Ada")))
            .unwrap();
        processor.process(&mut ledger, member("Ada", "100")).unwrap();

        assert_eq!(processor.stats(), ImportStats { applied: 1, rejected: 1 });
        assert_eq!(ledger.transactions()[0].member_id, None);
    }

    #[test]
    fn income_rows_ignore_the_member_column() {
        let mut ledger = FamilyLedger::open(MemoryStore::new()).unwrap();
        let mut processor = Processor::new();

        let income = LedgerEvent::AddTransaction {
            tx_type: TxType::Income,
            description: "pocket money".into(),
            amount: "20".into(),
            category: "others".into(),
            member: Some("Nobody".into()),
        };
        processor.process(&mut ledger, income).unwrap();

        assert_eq!(processor.stats(), ImportStats { applied: 1, rejected: 0 });
        assert_eq!(ledger.transactions()[0].member_id, None);
    }
}
