pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;
pub const MIN_TICK_MS: u64 = 10;
pub const MAX_TICK_MS: u64 = 1000;

pub const STARTING_LIVES: u32 = 3;
pub const VULNERABLE_DURATION_MS: u64 = 8_000;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const CAPTURE_SCORE: u32 = 200;

pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const FEARFUL_RADIUS: i32 = 8;
pub const WANDER_TURN_CHANCE: f32 = 0.1;
pub const MIXED_CHASE_CHANCE: f32 = 0.5;

pub const AUTOPILOT_DANGER_RADIUS: i32 = 2;
pub const EVENT_BUFFER_LIMIT: usize = 256;

pub const CONFIG_ENV_VAR: &str = "PACKMAN_SIM_CONFIG";
pub const CONFIG_DEFAULT_PATH: &str = "config/sim.toml";
pub const HIGH_SCORE_DEFAULT_PATH: &str = ".data/highscore.dat";

/// 28x28 maze with a tunnel on row 13 and the pursuer house on rows 12-13.
pub const CLASSIC_LAYOUT: &str = "\
############################
#............##............#
#.####.#####.##.#####.####.#
#o####.#####.##.#####.####o#
#.####.#####.##.#####.####.#
#..........................#
#.####.##.########.##.####.#
#.####.##.########.##.####.#
#......##....##....##......#
######.#####.##.#####.######
######.#####.##.#####.######
######.##..........##.######
######.##.###CA###.##.######
..........## MF ##..........
######.##.########.##.######
######.##..........##.######
######.##.########.##.######
#............##............#
#.####.#####.##.#####.####.#
#.####.#####.##.#####.####.#
#o..##................##..o#
###.##.##.########.##.##.###
###.##.##.########.##.##.###
#......##....#P....##......#
#.##########.##.##########.#
#.##########.##.##########.#
#..........................#
############################";
