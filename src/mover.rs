use crate::maze::Maze;
use crate::types::{Direction, Position};

pub fn offset(pos: Position, dir: Direction) -> Position {
    let (dx, dy) = dir.delta();
    Position::new(pos.col + dx, pos.row + dy)
}

pub fn can_step(maze: &Maze, pos: Position, dir: Direction) -> bool {
    if dir == Direction::None {
        return false;
    }
    maze.neighbor(pos, dir)
        .map(|next| !maze.is_wall(next))
        .unwrap_or(false)
}

pub fn step(maze: &Maze, pos: Position, dir: Direction) -> Position {
    maze.neighbor(pos, dir).unwrap_or_else(|| offset(pos, dir))
}

pub fn legal_directions(maze: &Maze, pos: Position) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|dir| can_step(maze, pos, *dir))
        .collect()
}

pub fn first_legal(maze: &Maze, pos: Position) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|dir| can_step(maze, pos, *dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ROOM: &str = "\
#######
#.....#
#.#.#.#
.......
#.....#
#######";

    fn room() -> Maze {
        Maze::parse(ROOM).expect("maze parses")
    }

    #[test]
    fn walls_and_none_block_movement() {
        let maze = room();
        let corner = Position::new(1, 1);
        assert!(!can_step(&maze, corner, Direction::Up));
        assert!(!can_step(&maze, corner, Direction::Left));
        assert!(!can_step(&maze, corner, Direction::None));
        assert!(can_step(&maze, corner, Direction::Right));
        assert!(can_step(&maze, corner, Direction::Down));
        assert_eq!(
            legal_directions(&maze, corner),
            vec![Direction::Down, Direction::Right]
        );
        assert_eq!(first_legal(&maze, corner), Some(Direction::Down));
    }

    #[test]
    fn tunnel_row_wraps_horizontally() {
        let maze = room();
        let left_edge = Position::new(0, 3);
        assert!(can_step(&maze, left_edge, Direction::Left));
        assert_eq!(
            step(&maze, left_edge, Direction::Left),
            Position::new(6, 3)
        );
        let right_edge = Position::new(6, 3);
        assert_eq!(
            step(&maze, right_edge, Direction::Right),
            Position::new(0, 3)
        );
    }

    #[test]
    fn vertical_edges_never_wrap() {
        let maze = Maze::parse("...\n...").expect("maze parses");
        assert!(!can_step(&maze, Position::new(1, 0), Direction::Up));
        assert!(!can_step(&maze, Position::new(1, 1), Direction::Down));
    }

    #[test]
    fn enclosed_cell_has_no_legal_direction() {
        let maze = Maze::parse("###\n# #\n###").expect("maze parses");
        assert_eq!(first_legal(&maze, Position::new(1, 1)), None);
    }

    proptest! {
        #[test]
        fn legal_step_moves_exactly_one_cell_or_wraps(
            col in 0i32..7,
            row in 0i32..6,
            dir_idx in 0usize..4,
        ) {
            let maze = room();
            let pos = Position::new(col, row);
            let dir = Direction::ALL[dir_idx];
            prop_assume!(!maze.is_wall(pos));
            prop_assume!(can_step(&maze, pos, dir));
            let next = step(&maze, pos, dir);
            prop_assert!(!maze.is_wall(next));
            let (dx, dy) = dir.delta();
            prop_assert_eq!(next.row - pos.row, dy);
            if dir.is_horizontal() {
                let moved = next.col - pos.col;
                let wrapped = moved.abs() == maze.width() - 1;
                prop_assert!(moved == dx || wrapped);
                if wrapped {
                    prop_assert!(pos.col == 0 || pos.col == maze.width() - 1);
                }
            } else {
                prop_assert_eq!(next.col, pos.col);
            }
        }
    }
}
