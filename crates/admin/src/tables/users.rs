//! User management table.

use std::str::FromStr;

use tracing::instrument;
use voltmart_core::validation::{FieldErrors, UserEditField};
use voltmart_core::{Gender, UserId};
use voltmart_storefront::api::{ApiClient, User, UserUpdate};

use super::{AdminTable, Table};
use crate::components::data_table::TableColumn;
use crate::error::{AdminError, Result};

/// Admin edit form. Email is shown but not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEditForm {
    pub name: String,
    pub mobile: String,
    pub gender: String,
}

impl From<&User> for UserEditForm {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            mobile: user.mobile.clone(),
            gender: user.gender.map(|g| g.as_str().to_owned()).unwrap_or_default(),
        }
    }
}

impl UserEditForm {
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            (UserEditField::Name, &self.name),
            (UserEditField::Mobile, &self.mobile),
            (UserEditField::Gender, &self.gender),
        ] {
            errors.record(field.key(), field.check(value));
        }
        errors.into_result()
    }
}

/// Registered users in the admin console.
#[derive(Debug)]
pub struct UserTable {
    api: ApiClient,
    table: Table<User>,
}

impl AdminTable for UserTable {
    type Row = User;

    const COLUMNS: &'static [TableColumn] = &[
        TableColumn::new("id", "ID"),
        TableColumn::new("name", "Name"),
        TableColumn::new("email", "Email"),
        TableColumn::new("mobile", "Mobile"),
        TableColumn::new("gender", "Gender"),
        TableColumn::new("role", "Role"),
    ];

    const EMPTY_MESSAGE: &'static str = "No users found";

    fn table(&self) -> &Table<User> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut Table<User> {
        &mut self.table
    }

    fn cells(user: &User) -> Vec<String> {
        vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.mobile.clone(),
            user.gender.map_or_else(|| "-".to_string(), |g| g.to_string()),
            user.role.to_string(),
        ]
    }
}

impl UserTable {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            table: Table::default(),
        }
    }

    /// Fetch every user.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let users = self.api.list_users().await?;
        tracing::debug!(count = users.len(), "Users loaded");
        self.table.replace(users);
        Ok(())
    }

    /// Save an edit and apply it to the loaded row.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] without a network call,
    /// [`AdminError::NotFound`] when the user is not loaded, or the API
    /// error.
    #[instrument(skip(self, form), fields(user_id = %id))]
    pub async fn edit(&mut self, id: &UserId, form: &UserEditForm) -> Result<Option<String>> {
        form.validate()?;
        if self.table.find(|user| &user.id == id).is_none() {
            return Err(AdminError::NotFound(format!("user {id}")));
        }

        let update = UserUpdate {
            name: form.name.trim().to_owned(),
            email: None,
            mobile: form.mobile.trim().to_owned(),
            gender: form.gender.trim().to_owned(),
        };
        let message = self.api.update_user(id, &update).await?;

        let mut rows = self.table.rows().to_vec();
        if let Some(user) = rows.iter_mut().find(|user| &user.id == id) {
            user.name.clone_from(&update.name);
            user.mobile.clone_from(&update.mobile);
            user.gender = Gender::from_str(&update.gender).ok();
        }
        self.table.replace(rows);
        tracing::info!("User updated");
        Ok(message)
    }

    /// Delete a user and drop them from the list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails; the list is then unchanged.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&mut self, id: &UserId) -> Result<Option<String>> {
        let message = self.api.delete_user(id).await?;
        self.table.remove_where(|user| &user.id == id);
        tracing::info!("User deleted");
        Ok(message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltmart_core::UserRole;
    use voltmart_storefront::config::StorefrontConfig;
    use voltmart_storefront::session::SessionStore;

    use super::*;

    fn table() -> UserTable {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9").unwrap();
        UserTable::new(ApiClient::new(&config, SessionStore::in_memory()).unwrap())
    }

    fn user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Asha Verma".to_string(),
            email: "asha@voltmart.in".to_string(),
            mobile: "9876543210".to_string(),
            gender: Some(Gender::Female),
            role: UserRole::Customer,
        }
    }

    #[test]
    fn test_edit_form_validation() {
        assert!(UserEditForm::from(&user()).validate().is_ok());

        let form = UserEditForm {
            name: String::new(),
            mobile: "+919876543210".to_string(),
            gender: "Male".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("user_name"), Some("All fields are required!"));
        assert_eq!(
            errors.get("user_mobile"),
            Some("Mobile number must be exactly 10 digits.")
        );
    }

    #[tokio::test]
    async fn test_edit_unknown_user() {
        let mut table = table();
        let form = UserEditForm::from(&user());
        assert!(matches!(
            table.edit(&UserId::new("u1"), &form).await,
            Err(AdminError::NotFound(_))
        ));
    }

    #[test]
    fn test_cells() {
        assert_eq!(
            UserTable::cells(&user()),
            vec![
                "u1",
                "Asha Verma",
                "asha@voltmart.in",
                "9876543210",
                "Female",
                "customer"
            ]
        );
    }
}
