use kbsweeper::util::Board;
use kbsweeper::{Cell, KnowledgeBase};
fn main() {
    let board_str = concat!(
        "...\n",
        "*..\n",
        "...\n",
    );
    let board = Board::new(board_str).unwrap();
    println!("Board:\n{}", board);

    let mut knowledge = KnowledgeBase::with_seed(board.size(), 0).unwrap();
    for cell in [Cell::new(0, 1), Cell::new(0, 0)] {
        let count = board.adjacent_mines(cell);
        knowledge.record_observation(cell, count).unwrap();
        println!("Observed {} = {}", cell, count);
    }
    knowledge.deduce().unwrap();

    println!("Sentences:");
    for sentence in knowledge.sentences() {
        println!("  {}", sentence);
    }
    println!("Mines: {:?}", knowledge.mines());
    println!("Safes: {:?}", knowledge.safes());
    println!("Next move: {:?}", knowledge.next_move());
}
