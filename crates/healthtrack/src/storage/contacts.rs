use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::error::Result;
use crate::records::{EmergencyContact, NewContact};

use super::Storage;

const CONTACT_COLUMNS: &str = "id, user_id, name, relationship, phone";

impl Storage {
    /// Insert an already-validated emergency contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_contact(&self, user_id: i64, contact: &NewContact) -> Result<EmergencyContact> {
        self.conn.execute(
            "INSERT INTO contacts (user_id, name, relationship, phone) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, contact.name, contact.relationship, contact.phone],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted contact with id {}", id);
        Ok(EmergencyContact {
            id,
            user_id,
            name: contact.name.clone(),
            relationship: contact.relationship.clone(),
            phone: contact.phone.clone(),
        })
    }

    /// Get a contact owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_contact(&self, user_id: i64, id: i64) -> Result<Option<EmergencyContact>> {
        let contact = self
            .conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
                Self::row_to_contact,
            )
            .optional()?;
        Ok(contact)
    }

    /// Replace a contact's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_contact(&self, user_id: i64, id: i64, contact: &NewContact) -> Result<bool> {
        let rows = self.conn.execute(
            r"
            UPDATE contacts SET name = ?1, relationship = ?2, phone = ?3
            WHERE id = ?4 AND user_id = ?5
            ",
            params![contact.name, contact.relationship, contact.phone, id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_contact(&self, user_id: i64, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM contacts WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// All contacts of a user in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn contacts_for_user(&self, user_id: i64) -> Result<Vec<EmergencyContact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = ?1 ORDER BY id ASC"
        ))?;
        let contacts = stmt
            .query_map([user_id], Self::row_to_contact)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<EmergencyContact> {
        Ok(EmergencyContact {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            relationship: row.get(3)?,
            phone: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn new_contact(name: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            relationship: "sister".to_string(),
            phone: "+919876543210".to_string(),
        }
    }

    #[test]
    fn test_insert_and_list_contacts() {
        let storage = create_test_storage();
        let user = create_test_user(&storage, "asha@example.com", "+919876543210").id;

        let first = storage.insert_contact(user, &new_contact("Meera")).unwrap();
        storage.insert_contact(user, &new_contact("Ravi")).unwrap();

        let contacts = storage.contacts_for_user(user).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0], first);
        assert_eq!(contacts[1].name, "Ravi");
    }

    #[test]
    fn test_update_and_delete_contact() {
        let storage = create_test_storage();
        let user = create_test_user(&storage, "asha@example.com", "+919876543210").id;
        let contact = storage.insert_contact(user, &new_contact("Meera")).unwrap();

        let mut edit = new_contact("Meera K");
        edit.relationship = "cousin".to_string();
        assert!(storage.update_contact(user, contact.id, &edit).unwrap());

        let fetched = storage.get_contact(user, contact.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Meera K");
        assert_eq!(fetched.relationship, "cousin");

        assert!(storage.delete_contact(user, contact.id).unwrap());
        assert!(storage.get_contact(user, contact.id).unwrap().is_none());
    }

    #[test]
    fn test_contacts_scoped_to_owner() {
        let storage = create_test_storage();
        let user = create_test_user(&storage, "asha@example.com", "+919876543210").id;
        let other = create_test_user(&storage, "b@example.com", "+911111111111").id;
        let contact = storage.insert_contact(user, &new_contact("Meera")).unwrap();

        assert!(storage.contacts_for_user(other).unwrap().is_empty());
        assert!(storage.get_contact(other, contact.id).unwrap().is_none());
        assert!(!storage
            .update_contact(other, contact.id, &new_contact("X"))
            .unwrap());
        assert!(!storage.delete_contact(other, contact.id).unwrap());
    }
}
