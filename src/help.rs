use crate::terminal::Terminal;
use crossterm::style::Color;

pub const HELP_TEXT: &str = "\
goldenrain

any key      shower the tree
E M I        spell a name for a party
M A M A      call the doctor
R O O M B A  send in the roomba
click/drag   pop something out
swipe down   MAMA   swipe sideways  ROOMBA
triple tap   EMI

space  pause     ?  close help
esc    quit";

/// Draw a centered box with `help_text` over whatever is in the buffer
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = term.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border = Some(Color::White);
    let text = Some(Color::Grey);
    let bottom_y = start_y + box_height - 1;

    // ┌─────┐
    term.set(start_x as i32, start_y as i32, '┌', border, false);
    term.set(start_x as i32, bottom_y as i32, '└', border, false);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, start_y as i32, '─', border, false);
        term.set((start_x + x) as i32, bottom_y as i32, '─', border, false);
    }
    term.set((start_x + box_width - 1) as i32, start_y as i32, '┐', border, false);
    term.set((start_x + box_width - 1) as i32, bottom_y as i32, '┘', border, false);

    for (i, line) in lines.iter().enumerate() {
        let y = (start_y + 1 + i) as i32;
        term.set(start_x as i32, y, '│', border, false);
        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        // First line is the title
        term.set_str(start_x as i32 + 1, y, &padded, text, i == 0);
        term.set((start_x + box_width - 1) as i32, y, '│', border, false);
    }
}
