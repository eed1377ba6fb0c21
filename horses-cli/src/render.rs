//! Plain-text board rendering

use horses_core::GameState;

const CELL_WIDTH: usize = 4;

/// Render the board, one row per line, followed by turn and scores.
///
/// Horses show their id, blocked cells `##`, reward cells their value and
/// empty cells `.`.
pub fn render_board(state: &GameState) -> String {
    let board = state.board();
    let occupied = state.occupied_positions();
    let mut out = String::new();

    for y in 0..board.height() {
        for x in 0..board.width() {
            let pos = horses_core::Position::new(x, y);
            let cell = if let Some(id) = occupied.get(&pos) {
                id.to_string()
            } else if board.is_blocked(pos) {
                "##".to_string()
            } else if board.has_reward(pos) {
                board.reward_at(pos).to_string()
            } else {
                ".".to_string()
            };
            out.push_str(&format!("{:>width$}", cell, width = CELL_WIDTH));
        }
        out.push('\n');
    }

    let turn = state.turn().map_or_else(|| "-".to_string(), |t| t.to_string());
    let scores: Vec<String> = state
        .scores()
        .iter()
        .map(|(player, score)| format!("{}={}", player, score))
        .collect();
    out.push_str(&format!("Turn: {}    Scores: {}\n", turn, scores.join(" ")));
    out
}
