use crate::export::PlanNode;
use crate::instance::Instance;
use crate::types::{PlateId, Rect};

const MAX_COLS: f64 = 100.0;
const MAX_ROWS: f64 = 40.0;

/// ASCII layout of one plate: cut boundaries as box drawing, items labeled
/// with their dimensions, defect areas hatched with '#'.
pub fn render_plate(instance: &Instance, nodes: &[PlanNode], plate: PlateId) -> String {
    let scale = f64::min(
        MAX_COLS / instance.plate_length() as f64,
        MAX_ROWS / instance.plate_width() as f64,
    );
    let cols = (instance.plate_length() as f64 * scale).round() as usize;
    let rows = (instance.plate_width() as f64 * scale).round() as usize;
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; cols + 1]; rows + 1];
    let to_cell = |v: i64| (v as f64 * scale).round() as usize;

    draw_rect(&mut grid, 0, 0, cols, rows);

    for d in instance.defects(plate) {
        hatch(&mut grid, to_cell(d.rect.left), to_cell(d.rect.bottom), to_cell(d.rect.right), to_cell(d.rect.top));
    }

    for node in nodes.iter().filter(|n| n.plate == plate) {
        draw_scaled(&mut grid, &node.rect, to_cell);
        for item in &node.items {
            draw_scaled(&mut grid, &item.rect, to_cell);
            label(&mut grid, &item.rect, to_cell, &format!("{}x{}", item.rect.length(), item.rect.width()));
        }
    }

    // Rows are stored bottom-up; print top-down.
    let mut out = String::new();
    for row in grid.iter().rev() {
        let line: String = row.iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn draw_scaled(grid: &mut [Vec<char>], rect: &Rect, to_cell: impl Fn(i64) -> usize) {
    let (x0, y0) = (to_cell(rect.left), to_cell(rect.bottom));
    let (x1, y1) = (to_cell(rect.right), to_cell(rect.top));
    if x1 > x0 && y1 > y0 {
        draw_rect(grid, x0, y0, x1 - x0, y1 - y0);
    }
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = grid.first().map_or(0, |r| r.len());
    for i in x..=x + w {
        for &j in &[y, y + h] {
            if i < cols && j < rows {
                grid[j][i] = join(grid[j][i], '-');
            }
        }
    }
    for j in y..=y + h {
        for &i in &[x, x + w] {
            if i < cols && j < rows {
                grid[j][i] = join(grid[j][i], '|');
            }
        }
    }
    for &i in &[x, x + w] {
        for &j in &[y, y + h] {
            if i < cols && j < rows {
                grid[j][i] = '+';
            }
        }
    }
}

fn join(existing: char, drawn: char) -> char {
    if existing == '+' || (existing == '-' && drawn == '|') || (existing == '|' && drawn == '-') {
        '+'
    } else {
        drawn
    }
}

fn hatch(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize) {
    let rows = grid.len();
    let cols = grid.first().map_or(0, |r| r.len());
    for j in y0..=y1 {
        for i in x0..=x1 {
            if i < cols && j < rows {
                grid[j][i] = '#';
            }
        }
    }
}

fn label(grid: &mut [Vec<char>], rect: &Rect, to_cell: impl Fn(i64) -> usize, text: &str) {
    let (x0, y0) = (to_cell(rect.left), to_cell(rect.bottom));
    let (x1, y1) = (to_cell(rect.right), to_cell(rect.top));
    if x1 <= x0 + 2 || y1 <= y0 {
        return;
    }
    let chars: Vec<char> = text.chars().collect();
    let cy = y0 + (y1 - y0) / 2;
    let cx = (x0 + x1) / 2;
    let start = cx.saturating_sub(chars.len() / 2);
    for (k, &ch) in chars.iter().enumerate() {
        let x = start + k;
        if x > x0 && x < x1 && cy > y0 && cy < y1 && cy < grid.len() && x < grid[cy].len() {
            grid[cy][x] = ch;
        }
    }
}
