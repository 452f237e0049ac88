pub use super::game_boards::Entity as GameBoards;
pub use super::leaderboards::Entity as Leaderboards;
pub use super::users::Entity as Users;
