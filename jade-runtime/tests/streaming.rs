//! Render functions written in the shape the compiler emits.

use std::io;

use jadec_runtime::{Closed, PooledBuffer, copy, finish, format, pipe, write_esc, write_int};

fn list(items: &[&str], wr: &mut dyn io::Write) -> io::Result<()> {
    let (mut w, r) = pipe();
    std::thread::scope(|s| {
        let producer = s.spawn(move || -> Result<(), Closed> {
            let buffer = &mut w;
            buffer.write_str("<ul>")?;
            for item in items {
                buffer.write_str("<li>")?;
                write_esc(item, buffer)?;
                buffer.write_str("</li>")?;
            }
            buffer.write_str("</ul>")?;
            w.close();
            Ok(())
        });
        let consumed = copy(r, wr);
        finish(producer, consumed)
    })
}

fn counted(count: i64, buffer: &mut PooledBuffer) -> io::Result<()> {
    let (mut w, r) = pipe();
    std::thread::scope(|s| {
        let producer = s.spawn(move || -> Result<(), Closed> {
            let buffer = &mut w;
            buffer.write_str("<p>")?;
            write_int(count, buffer)?;
            buffer.write_str("</p>")?;
            w.close();
            Ok(())
        });
        let consumed = format(r, buffer);
        finish(producer, consumed)
    })
}

fn render(items: &[&str]) -> String {
    let mut out = Vec::new();
    list(items, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_empty_sequence() {
    assert_eq!(render(&[]), "<ul></ul>");
}

#[test]
fn test_single_element() {
    assert_eq!(render(&["a"]), "<ul><li>a</li></ul>");
}

#[test]
fn test_elements_in_iteration_order() {
    assert_eq!(
        render(&["red", "green", "blue"]),
        "<ul><li>red</li><li>green</li><li>blue</li></ul>"
    );
}

#[test]
fn test_pooled_destination_pretty_printed() {
    let mut buffer = PooledBuffer::new();
    counted(3, &mut buffer).unwrap();
    assert_eq!(buffer.to_string_lossy(), "<p>3</p>\n");
}

struct FailingSink;

impl io::Write for FailingSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_consumer_failure_stops_producer() {
    let items = vec!["x"; 1000];
    let err = list(&items, &mut FailingSink).unwrap_err();
    assert_eq!(err.to_string(), "disk full");
}
