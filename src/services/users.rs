use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::storage::UserStorage;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStorage>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStorage>) -> Self {
        Self { users }
    }

    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.get_all().await?)
    }

    pub async fn get_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.users.get_by_id(user_id).await?)
    }

    pub async fn create(&self, user: User) -> AppResult<User> {
        Ok(self.users.create(user).await?)
    }

    pub async fn update(&self, user: User) -> AppResult<Option<User>> {
        Ok(self.users.update(user).await?)
    }

    /// Add a one-directional friend link. Self-friending is rejected as a
    /// parameter error; both users must exist. No reciprocal write.
    pub async fn add_friend(&self, person_id: i64, friend_id: i64) -> AppResult<()> {
        if person_id == friend_id {
            return Err(AppError::Parameter(
                "A user cannot add themselves as a friend".to_string(),
            ));
        }

        self.require_user(person_id).await?;
        self.require_user(friend_id).await?;
        Ok(self.users.add_friend(person_id, friend_id).await?)
    }

    /// Remove a one-directional friend link. Removing a link that does
    /// not exist is a no-op.
    pub async fn remove_friend(&self, person_id: i64, friend_id: i64) -> AppResult<()> {
        self.require_user(person_id).await?;
        self.require_user(friend_id).await?;
        Ok(self.users.remove_friend(person_id, friend_id).await?)
    }

    /// Resolve the user's friend-id set to full user records.
    pub async fn friends_of(&self, user_id: i64) -> AppResult<Vec<User>> {
        let user = self.require_user(user_id).await?;

        let mut ids: Vec<i64> = user.friend_ids.into_iter().collect();
        ids.sort_unstable();
        Ok(self.users.get_by_id_list(&ids).await?)
    }

    /// Users present in both friend sets. Commutative in its arguments.
    pub async fn mutual_friends(&self, user_id1: i64, user_id2: i64) -> AppResult<Vec<User>> {
        let user1 = self.require_user(user_id1).await?;
        let user2 = self.require_user(user_id2).await?;

        let mut shared: Vec<i64> = user1
            .friend_ids
            .intersection(&user2.friend_ids)
            .copied()
            .collect();
        shared.sort_unstable();
        Ok(self.users.get_by_id_list(&shared).await?)
    }

    async fn require_user(&self, user_id: i64) -> AppResult<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryUserStorage;
    use chrono::NaiveDate;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserStorage::new()))
    }

    fn user(login: &str) -> User {
        User {
            email: format!("{}@example.com", login),
            login: login.to_string(),
            name: login.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 6, 15),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn friendship_is_not_reciprocal() {
        let service = service();
        let ann = service.create(user("ann")).await.unwrap();
        let bob = service.create(user("bob")).await.unwrap();

        service.add_friend(ann.id, bob.id).await.unwrap();

        let ann_friends = service.friends_of(ann.id).await.unwrap();
        assert_eq!(ann_friends.len(), 1);
        assert_eq!(ann_friends[0].id, bob.id);

        assert!(service.friends_of(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn self_friending_is_a_parameter_error() {
        let service = service();
        let ann = service.create(user("ann")).await.unwrap();

        let err = service.add_friend(ann.id, ann.id).await.unwrap_err();
        assert!(matches!(err, AppError::Parameter(_)));
    }

    #[tokio::test]
    async fn friend_operations_check_existence() {
        let service = service();
        let ann = service.create(user("ann")).await.unwrap();

        assert!(matches!(
            service.add_friend(ann.id, 99).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.remove_friend(99, ann.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.friends_of(99).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn removing_an_absent_link_is_a_noop() {
        let service = service();
        let ann = service.create(user("ann")).await.unwrap();
        let bob = service.create(user("bob")).await.unwrap();

        service.remove_friend(ann.id, bob.id).await.unwrap();
        assert!(service.friends_of(ann.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutual_friends_is_commutative() {
        let service = service();
        let ann = service.create(user("ann")).await.unwrap();
        let bob = service.create(user("bob")).await.unwrap();
        let eve = service.create(user("eve")).await.unwrap();

        service.add_friend(ann.id, eve.id).await.unwrap();
        service.add_friend(bob.id, eve.id).await.unwrap();
        service.add_friend(ann.id, bob.id).await.unwrap();

        let forward = service.mutual_friends(ann.id, bob.id).await.unwrap();
        let backward = service.mutual_friends(bob.id, ann.id).await.unwrap();

        let forward_ids: Vec<i64> = forward.iter().map(|u| u.id).collect();
        let backward_ids: Vec<i64> = backward.iter().map(|u| u.id).collect();
        assert_eq!(forward_ids, vec![eve.id]);
        assert_eq!(forward_ids, backward_ids);
    }

    #[tokio::test]
    async fn freshly_linked_users_share_no_friends() {
        let service = service();
        let ann = service.create(user("ann")).await.unwrap();
        let bob = service.create(user("bob")).await.unwrap();

        service.add_friend(ann.id, bob.id).await.unwrap();
        assert!(service
            .mutual_friends(ann.id, bob.id)
            .await
            .unwrap()
            .is_empty());
    }
}
