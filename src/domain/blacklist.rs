//! Blacklist orchestration: registry resolution, duplicate rejection,
//! statistics and CSV import/export.

use std::sync::Arc;

use chrono::{Days, Local};

use crate::domain::error::{Result, ServiceError};
use crate::domain::models::{
    BlacklistEntry, BlacklistEntryView, BlacklistStats, DATETIME_FORMAT, ImportReport,
};
use crate::domain::ports::{AttackerRepo, BlacklistRepo, UserRepo};

const CSV_HEADER: &str = "Número,Motivo,Fecha,Nivel de Riesgo";

pub struct BlacklistService {
    users: Arc<dyn UserRepo>,
    attackers: Arc<dyn AttackerRepo>,
    entries: Arc<dyn BlacklistRepo>,
}

impl BlacklistService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        attackers: Arc<dyn AttackerRepo>,
        entries: Arc<dyn BlacklistRepo>,
    ) -> Self {
        Self {
            users,
            attackers,
            entries,
        }
    }

    /// Blacklists `value` for a user, creating the shared attacker record on
    /// first sight. A second entry for the same (user, value) pair is a
    /// conflict.
    pub async fn add(
        &self,
        user_id: i64,
        value: &str,
        kind: &str,
        reason: &str,
    ) -> Result<BlacklistEntry> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".into()))?;

        let attacker = self.attackers.find_or_create(value, kind).await?;

        let entry = BlacklistEntry {
            id: 0,
            user_id,
            attacker_id: attacker.id,
            reason: reason.to_string(),
            created_at: Local::now().naive_local(),
        };
        self.entries.insert(entry).await?.ok_or_else(|| {
            ServiceError::Conflict("El atacante ya está en la lista negra".into())
        })
    }

    /// A user's entries joined with their attacker records.
    pub async fn list(&self, user_id: i64) -> Result<Vec<BlacklistEntryView>> {
        let mut views = Vec::new();
        for entry in self.entries.find_by_user(user_id).await? {
            let attacker = self.attackers.get(entry.attacker_id).await?.ok_or_else(|| {
                ServiceError::Internal(format!(
                    "atacante {} no existe para la entrada {}",
                    entry.attacker_id, entry.id
                ))
            })?;
            views.push(BlacklistEntryView { entry, attacker });
        }
        Ok(views)
    }

    /// Deletes one entry. The attacker record survives so its reputation and
    /// history persist even when no user still blacklists it.
    pub async fn remove(&self, entry_id: i64) -> Result<()> {
        if self.entries.delete(entry_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(
                "No existe la entrada en la lista negra".into(),
            ))
        }
    }

    pub async fn stats(&self, user_id: i64) -> Result<BlacklistStats> {
        let views = self.list(user_id).await?;

        let today = Local::now().date_naive();
        let week_floor = today
            .checked_sub_days(Days::new(7))
            .unwrap_or(chrono::NaiveDate::MIN);

        let blocked_today = views
            .iter()
            .filter(|v| v.entry.created_at.date() == today)
            .count();
        let blocked_this_week = views
            .iter()
            .filter(|v| v.entry.created_at.date() > week_floor)
            .count();

        // The upstream data model stores "correo"/"telefono" in `kind`, so
        // this lookup always falls back to 1. Kept verbatim; see DESIGN.md.
        let average = if views.is_empty() {
            1.0
        } else {
            views
                .iter()
                .map(|v| f64::from(severity(&v.attacker.kind)))
                .sum::<f64>()
                / views.len() as f64
        };
        let avg_risk_level = if average < 1.5 {
            "Bajo"
        } else if average < 2.5 {
            "Medio"
        } else {
            "Alto"
        };

        Ok(BlacklistStats {
            total: views.len(),
            blocked_today,
            blocked_this_week,
            avg_risk_level: avg_risk_level.to_string(),
        })
    }

    /// Renders a user's blacklist as CSV. Fields are comma-joined without
    /// escaping, so a reason containing a comma corrupts its row; the format
    /// is kept for compatibility with existing exports.
    pub async fn export_csv(&self, user_id: i64) -> Result<String> {
        let rows = self
            .list(user_id)
            .await?
            .iter()
            .map(|v| {
                format!(
                    "{},{},{},{}",
                    v.attacker.value,
                    v.entry.reason,
                    v.entry.created_at.format(DATETIME_FORMAT),
                    v.attacker.kind
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("{CSV_HEADER}\n{rows}"))
    }

    /// Best-effort CSV import. The first line is assumed to be a header and
    /// skipped; each remaining non-blank line needs at least the columns
    /// `value,reason,kind`. Per-row failures are counted, never surfaced.
    pub async fn import_csv(&self, user_id: i64, csv: &str) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for line in csv.lines().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cols: Vec<&str> = line.split(',').collect();
            if cols.len() < 3 {
                report.errors += 1;
                continue;
            }

            let (value, reason, kind) = (cols[0].trim(), cols[1].trim(), cols[2].trim());
            match self.add(user_id, value, kind, reason).await {
                Ok(_) => report.success += 1,
                Err(err) => {
                    tracing::debug!("import row rejected: {err}");
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }
}

fn severity(kind: &str) -> u32 {
    match kind.to_lowercase().as_str() {
        "bajo" => 1,
        "medio" => 2,
        "alto" => 3,
        _ => 1,
    }
}
