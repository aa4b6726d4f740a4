use rusqlite::{params, OptionalExtension, Result, Row};

use super::models::FormRecord;
use super::Database;

fn form_from_row(row: &Row<'_>) -> Result<FormRecord> {
    let id: i64 = row.get(0)?;
    Ok(FormRecord {
        id: id as u64,
        title: row.get(1)?,
        content: row.get(2)?,
        mail_recipient: row.get(3)?,
        status: row.get(4)?,
    })
}

impl Database {
    pub fn upsert_form(&self, form: &FormRecord) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO forms (id, title, content, mail_recipient, status)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                mail_recipient = excluded.mail_recipient,
                status = excluded.status",
            params![
                form.id as i64,
                form.title,
                form.content,
                form.mail_recipient,
                form.status
            ],
        )?;
        Ok(())
    }

    pub fn get_form(&self, id: u64) -> Result<Option<FormRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, title, content, mail_recipient, status FROM forms WHERE id = ?1",
            params![id as i64],
            form_from_row,
        )
        .optional()
    }

    pub fn get_published_forms(&self) -> Result<Vec<FormRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, content, mail_recipient, status
             FROM forms WHERE status = 'publish' ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], form_from_row)?;
        let mut forms = Vec::new();
        for row in rows {
            forms.push(row?);
        }
        Ok(forms)
    }

    /// Returns false when no form has this id.
    pub fn set_form_recipient(&self, id: u64, recipient: &str) -> Result<bool> {
        let conn = self.conn();
        let updated = conn.execute(
            "UPDATE forms SET mail_recipient = ?1 WHERE id = ?2",
            params![recipient, id as i64],
        )?;
        Ok(updated > 0)
    }
}
