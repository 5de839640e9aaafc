pub mod comic_repo;
pub mod leaderboard_repo;
