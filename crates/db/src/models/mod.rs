pub mod comic;
pub mod leaderboard;
