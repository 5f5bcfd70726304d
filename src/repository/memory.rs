use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ProductRepository, ProfileRepository, RepositoryError, UserRepository};
use crate::database::models::{Product, Profile, User};
use crate::filter::{Filter, FilterOrder, SortDirection, UserFilter};

/// Repositories held in process memory.
///
/// Uniqueness and references are checked the way the database constraints
/// check them, so callers observe the same errors.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Store>>,
}

#[derive(Default)]
struct Store {
    products: BTreeMap<i64, Product>,
    profiles: BTreeMap<i64, Profile>,
    users: BTreeMap<i64, User>,
    next_product: i64,
    next_profile: i64,
    next_user: i64,
}

impl Store {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn attach_profile(&self, mut user: User) -> User {
        user.profile = self.profiles.get(&user.profile_id).cloned();
        user
    }

    fn ensure_profile(&self, profile_id: i64) -> Result<(), RepositoryError> {
        if self.profiles.contains_key(&profile_id) {
            Ok(())
        } else {
            Err(RepositoryError::ForeignKeyViolated("users_profile_id_fkey".to_string()))
        }
    }

    fn ensure_unique_mail(&self, user: &User) -> Result<(), RepositoryError> {
        let taken = self
            .users
            .values()
            .any(|u| u.id != user.id && u.mail == user.mail);
        if taken {
            return Err(RepositoryError::DuplicatedKey("users_mail_key".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Int(i64),
    Bool(bool),
    Text(String),
    Time(DateTime<Utc>),
}

/// Sorts and paginates `items` the way the SQL listings do.
fn arrange<T>(
    mut items: Vec<T>,
    filter: &Filter,
    sortable: &[&str],
    key: impl Fn(&T, &str) -> SortKey,
) -> Result<Vec<T>, RepositoryError> {
    let order = FilterOrder::resolve(filter, sortable)?;
    items.sort_by_cached_key(|item| key(item, &order.column));
    if order.sort == SortDirection::Desc {
        items.reverse();
    }

    Ok(match filter.pagination() {
        Some(page) => items
            .into_iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .collect(),
        None => items,
    })
}

fn matches_search(filter: &Filter, fields: &[&str]) -> bool {
    match filter.search_term() {
        Some(term) => {
            let term = term.to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&term))
        }
        None => true,
    }
}

fn product_key(product: &Product, column: &str) -> SortKey {
    match column {
        "name" => SortKey::Text(product.name.clone()),
        "created_at" => SortKey::Time(product.created_at),
        "updated_at" => SortKey::Time(product.updated_at),
        _ => SortKey::Int(product.id),
    }
}

fn profile_key(profile: &Profile, column: &str) -> SortKey {
    match column {
        "name" => SortKey::Text(profile.name.clone()),
        "created_at" => SortKey::Time(profile.created_at),
        "updated_at" => SortKey::Time(profile.updated_at),
        _ => SortKey::Int(profile.id),
    }
}

fn user_key(user: &User, column: &str) -> SortKey {
    match column {
        "name" => SortKey::Text(user.name.clone()),
        "mail" => SortKey::Text(user.mail.clone()),
        "status" => SortKey::Bool(user.status),
        "new" => SortKey::Bool(user.new),
        "profile_id" => SortKey::Int(user.profile_id),
        "created_at" => SortKey::Time(user.created_at),
        "updated_at" => SortKey::Time(user.updated_at),
        _ => SortKey::Int(user.id),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_matches(store: &Store, user: &User, filter: &UserFilter) -> bool {
        if let Some(profile_id) = filter.profile_id() {
            if user.profile_id != profile_id {
                return false;
            }
        }
        let profile_name = store
            .profiles
            .get(&user.profile_id)
            .map(|p| p.name.as_str())
            .unwrap_or_default();
        matches_search(&filter.filter, &[&user.name, &user.mail, profile_name])
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn count_products(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        let store = self.inner.read().await;
        let count = store
            .products
            .values()
            .filter(|p| matches_search(filter, &[&p.name]))
            .count();
        Ok(count as i64)
    }

    async fn get_products(&self, filter: &Filter) -> Result<Vec<Product>, RepositoryError> {
        let store = self.inner.read().await;
        let items = store
            .products
            .values()
            .filter(|p| matches_search(filter, &[&p.name]))
            .cloned()
            .collect();
        arrange(items, filter, Product::SORTABLE, product_key)
    }

    async fn get_product_by_id(&self, id: i64) -> Result<Product, RepositoryError> {
        let store = self.inner.read().await;
        store.products.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn create_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let mut store = self.inner.write().await;
        if store.products.values().any(|p| p.name == product.name) {
            return Err(RepositoryError::DuplicatedKey("product_name_key".to_string()));
        }

        let now = Utc::now();
        let created = Product {
            id: Store::next_id(&mut store.next_product),
            name: product.name.clone(),
            created_at: now,
            updated_at: now,
        };
        store.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let mut store = self.inner.write().await;
        if store
            .products
            .values()
            .any(|p| p.id != product.id && p.name == product.name)
        {
            return Err(RepositoryError::DuplicatedKey("product_name_key".to_string()));
        }

        let stored = store.products.get_mut(&product.id).ok_or(RepositoryError::NotFound)?;
        stored.name = product.name.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().await;
        store
            .products
            .remove(&product.id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn count_profiles(&self, filter: &Filter) -> Result<i64, RepositoryError> {
        let store = self.inner.read().await;
        let count = store
            .profiles
            .values()
            .filter(|p| matches_search(filter, &[&p.name]))
            .count();
        Ok(count as i64)
    }

    async fn get_profiles(&self, filter: &Filter) -> Result<Vec<Profile>, RepositoryError> {
        let store = self.inner.read().await;
        let items = store
            .profiles
            .values()
            .filter(|p| matches_search(filter, &[&p.name]))
            .cloned()
            .collect();
        arrange(items, filter, Profile::SORTABLE, profile_key)
    }

    async fn get_profile_by_id(&self, id: i64) -> Result<Profile, RepositoryError> {
        let store = self.inner.read().await;
        store.profiles.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn get_profile_by_name(&self, name: &str) -> Result<Profile, RepositoryError> {
        let store = self.inner.read().await;
        store
            .profiles
            .values()
            .find(|p| p.name == name)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_profile(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut store = self.inner.write().await;
        if store.profiles.values().any(|p| p.name == profile.name) {
            return Err(RepositoryError::DuplicatedKey("profiles_name_key".to_string()));
        }

        let now = Utc::now();
        let created = Profile {
            id: Store::next_id(&mut store.next_profile),
            name: profile.name.clone(),
            permissions: profile.permissions,
            created_at: now,
            updated_at: now,
        };
        store.profiles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut store = self.inner.write().await;
        if store
            .profiles
            .values()
            .any(|p| p.id != profile.id && p.name == profile.name)
        {
            return Err(RepositoryError::DuplicatedKey("profiles_name_key".to_string()));
        }

        let stored = store.profiles.get_mut(&profile.id).ok_or(RepositoryError::NotFound)?;
        stored.name = profile.name.clone();
        stored.permissions = profile.permissions;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_profile(&self, profile: &Profile) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().await;
        if store.users.values().any(|u| u.profile_id == profile.id) {
            return Err(RepositoryError::ForeignKeyViolated("users_profile_id_fkey".to_string()));
        }
        store
            .profiles
            .remove(&profile.id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn count_users(&self, filter: &UserFilter) -> Result<i64, RepositoryError> {
        let store = self.inner.read().await;
        let count = store
            .users
            .values()
            .filter(|u| Self::user_matches(&store, u, filter))
            .count();
        Ok(count as i64)
    }

    async fn get_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let store = self.inner.read().await;
        let items = store
            .users
            .values()
            .filter(|u| Self::user_matches(&store, u, filter))
            .cloned()
            .collect();
        let users = arrange(items, &filter.filter, User::SORTABLE, user_key)?;
        Ok(users.into_iter().map(|u| store.attach_profile(u)).collect())
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        let store = self.inner.read().await;
        let user = store.users.get(&id).cloned().ok_or(RepositoryError::NotFound)?;
        Ok(store.attach_profile(user))
    }

    async fn get_user_by_mail(&self, mail: &str) -> Result<User, RepositoryError> {
        let store = self.inner.read().await;
        let user = store
            .users
            .values()
            .find(|u| u.mail == mail)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        Ok(store.attach_profile(user))
    }

    async fn get_user_by_token(&self, token: &str) -> Result<User, RepositoryError> {
        let store = self.inner.read().await;
        let user = store
            .users
            .values()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        Ok(store.attach_profile(user))
    }

    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut store = self.inner.write().await;
        store.ensure_unique_mail(&User { id: 0, ..user.clone() })?;
        store.ensure_profile(user.profile_id)?;

        let now = Utc::now();
        let created = User {
            id: Store::next_id(&mut store.next_user),
            name: user.name.clone(),
            mail: user.mail.clone(),
            status: user.status,
            new: true,
            profile_id: user.profile_id,
            token: None,
            password: None,
            profile: None,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(created.id, created.clone());
        Ok(store.attach_profile(created))
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut store = self.inner.write().await;
        store.ensure_unique_mail(user)?;
        store.ensure_profile(user.profile_id)?;

        let stored = store.users.get_mut(&user.id).ok_or(RepositoryError::NotFound)?;
        stored.name = user.name.clone();
        stored.mail = user.mail.clone();
        stored.status = user.status;
        stored.profile_id = user.profile_id;
        stored.updated_at = Utc::now();
        let updated = stored.clone();
        Ok(store.attach_profile(updated))
    }

    async fn delete_user(&self, user: &User) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().await;
        store
            .users
            .remove(&user.id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn reset_user_password(&self, user: &User) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().await;
        let stored = store.users.get_mut(&user.id).ok_or(RepositoryError::NotFound)?;
        stored.password = None;
        stored.token = None;
        stored.new = true;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn set_user_password(&self, user: &User, token: &str, hash: &str) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().await;
        if store
            .users
            .values()
            .any(|u| u.id != user.id && u.token.as_deref() == Some(token))
        {
            return Err(RepositoryError::DuplicatedKey("users_token_key".to_string()));
        }

        let stored = store.users.get_mut(&user.id).ok_or(RepositoryError::NotFound)?;
        stored.password = Some(hash.to_string());
        stored.token = Some(token.to_string());
        stored.new = false;
        stored.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Permissions;

    async fn seeded() -> (MemoryStore, Profile) {
        let store = MemoryStore::new();
        let profile = store
            .create_profile(&Profile {
                name: "Sales".to_string(),
                permissions: Permissions { product_module: true, ..Permissions::default() },
                ..Profile::default()
            })
            .await
            .unwrap();
        (store, profile)
    }

    fn user(name: &str, mail: &str, profile_id: i64) -> User {
        User {
            name: name.to_string(),
            mail: mail.to_string(),
            status: true,
            profile_id,
            ..User::default()
        }
    }

    #[tokio::test]
    async fn users_come_back_with_their_profile() {
        let (store, profile) = seeded().await;
        let created = store
            .create_user(&user("Amina Juma", "amina@example.com", profile.id))
            .await
            .unwrap();

        assert!(created.new);
        assert_eq!(created.token, None);
        let loaded = store.get_user_by_mail("amina@example.com").await.unwrap();
        assert_eq!(loaded.profile.map(|p| p.name), Some("Sales".to_string()));
    }

    #[tokio::test]
    async fn duplicate_mail_and_missing_profile_are_rejected() {
        let (store, profile) = seeded().await;
        store
            .create_user(&user("Amina Juma", "amina@example.com", profile.id))
            .await
            .unwrap();

        let err = store
            .create_user(&user("Amina Other", "amina@example.com", profile.id))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicatedKey(_)));

        let err = store
            .create_user(&user("Baraka Ali", "baraka@example.com", 99))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolated(_)));
    }

    #[tokio::test]
    async fn profiles_in_use_cannot_be_deleted() {
        let (store, profile) = seeded().await;
        let created = store
            .create_user(&user("Amina Juma", "amina@example.com", profile.id))
            .await
            .unwrap();

        let err = store.delete_profile(&profile).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolated(_)));

        store.delete_user(&created).await.unwrap();
        store.delete_profile(&profile).await.unwrap();
    }

    #[tokio::test]
    async fn listing_sorts_searches_and_paginates() {
        let store = MemoryStore::new();
        for name in ["Rice", "Beans", "Maize", "Brown rice"] {
            store
                .create_product(&Product { name: name.to_string(), ..Product::default() })
                .await
                .unwrap();
        }

        let filter = Filter {
            sort: Some("name".to_string()),
            order: Some("desc".to_string()),
            limit: Some(2),
            page: Some(1),
            ..Filter::default()
        };
        let names: Vec<_> = store
            .get_products(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Rice", "Maize"]);

        let filter = Filter { search: Some("RICE".to_string()), ..Filter::default() };
        assert_eq!(store.count_products(&filter).await.unwrap(), 2);

        let filter = Filter { sort: Some("password".to_string()), ..Filter::default() };
        assert!(matches!(
            store.get_products(&filter).await,
            Err(RepositoryError::UndefinedColumn(_))
        ));
    }

    #[tokio::test]
    async fn password_lifecycle() {
        let (store, profile) = seeded().await;
        let created = store
            .create_user(&user("Amina Juma", "amina@example.com", profile.id))
            .await
            .unwrap();

        store.set_user_password(&created, "token-1", "hash").await.unwrap();
        let loaded = store.get_user_by_token("token-1").await.unwrap();
        assert!(!loaded.new);
        assert_eq!(loaded.password.as_deref(), Some("hash"));

        store.reset_user_password(&loaded).await.unwrap();
        let loaded = store.get_user_by_id(created.id).await.unwrap();
        assert!(loaded.new);
        assert_eq!(loaded.token, None);
        assert!(store.get_user_by_token("token-1").await.is_err());
    }
}
