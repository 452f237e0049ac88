pub mod game_boards;
pub mod leaderboards;
pub mod prelude;
pub mod users;
