use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use tello_core::display::thousands;

use crate::agenda::{Agenda, AgendaRow, CanchaAgenda};
use crate::error::{AgendaError, Result};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE: f32 = 6.0;

/// Column x positions (mm) for booking rows.
const COLS: [f32; 7] = [15.0, 52.0, 100.0, 130.0, 145.0, 168.0, 190.0];

/// `agenda-2025-03-02.pdf`
pub fn file_name(agenda: &Agenda) -> String {
    format!("agenda-{}.pdf", agenda.date.format("%Y-%m-%d"))
}

/// Lay the agenda out on as many A4 pages as it needs.
pub fn render_pdf(agenda: &Agenda) -> Result<Vec<u8>> {
    let title = format!("Agenda Futbol Tello {}", agenda.date.format("%Y-%m-%d"));
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_W), Mm(PAGE_H), "agenda");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AgendaError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AgendaError::Pdf(e.to_string()))?;

    let mut w = Writer {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        regular,
        bold,
        y: PAGE_H - MARGIN,
        pages: 1,
    };

    w.text(18.0, MARGIN, "Futbol Tello - Agenda del dia", true);
    w.advance(LINE * 1.5);
    w.text(12.0, MARGIN, &agenda.fecha, false);
    w.advance(LINE);
    w.text(
        10.0,
        MARGIN,
        &format!("Reservas: {}", agenda.reserva_count()),
        false,
    );
    w.advance(LINE * 1.5);

    if agenda.sites.is_empty() {
        w.text(11.0, MARGIN, "No hay canchas registradas.", false);
    }

    for site in &agenda.sites {
        w.ensure_room(LINE * 4.0);
        w.text(14.0, MARGIN, &format!("Local {}", site.site.name()), true);
        w.advance(LINE * 1.3);
        for cancha in &site.canchas {
            write_cancha(&mut w, cancha);
        }
        w.advance(LINE * 0.5);
    }

    drop(w);
    doc.save_to_bytes()
        .map_err(|e| AgendaError::Pdf(e.to_string()))
}

fn write_cancha(w: &mut Writer<'_>, cancha: &CanchaAgenda) {
    w.ensure_room(LINE * 3.0);
    w.text(
        11.0,
        MARGIN,
        &format!("{} ({})", cancha.nombre, cancha.jugadores),
        true,
    );
    w.advance(LINE);

    let header = ["Hora", "Cliente", "Celular", "Arb.", "Precio", "Estado", "Pagos"];
    for (x, label) in COLS.iter().zip(header) {
        w.text(8.0, *x, label, true);
    }
    w.advance(LINE * 0.8);

    if cancha.rows.is_empty() {
        w.text(9.0, COLS[0], "Sin reservas", false);
        w.advance(LINE);
    }
    for row in &cancha.rows {
        w.ensure_room(LINE);
        for (x, cell) in COLS.iter().zip(cells(row)) {
            w.text(9.0, *x, &cell, false);
        }
        w.advance(LINE);
    }
    w.advance(LINE * 0.5);
}

fn cells(row: &AgendaRow) -> [String; 7] {
    [
        row.hora.clone(),
        clip(&row.cliente, 26),
        clip(&row.celular, 16),
        if row.arbitro { "Si" } else { "No" }.to_string(),
        format!("CRC {}", thousands(row.precio)),
        if row.confirmada { "Confirmada" } else { "Pendiente" }.to_string(),
        row.pagos.to_string(),
    ]
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

/// The built-in PDF fonts only cover Latin-1 reliably; fold everything else.
fn fold_ascii(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

/// Cursor over the current page; starts a new page when it runs out of room.
struct Writer<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Writer<'_> {
    fn text(&self, size: f32, x: f32, s: &str, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(fold_ascii(s), size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed >= MARGIN {
            return;
        }
        self.pages += 1;
        let (page, layer) =
            self.doc
                .add_page(Mm(PAGE_W), Mm(PAGE_H), format!("agenda {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::{AgendaRow, SiteAgenda};
    use chrono::NaiveDate;
    use tello_core::Site;

    fn row(id: i64) -> AgendaRow {
        AgendaRow {
            reserva_id: id,
            hora: "8:00 AM - 9:00 AM".into(),
            cliente: "José Núñez".into(),
            celular: "8888-0000".into(),
            arbitro: true,
            precio: 25000,
            confirmada: false,
            pagos: 1,
        }
    }

    fn agenda(rows: usize) -> Agenda {
        Agenda {
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            fecha: "2 de marzo de 2025".into(),
            sites: vec![SiteAgenda {
                site: Site::Sabana,
                canchas: vec![
                    CanchaAgenda {
                        cancha_id: 1,
                        nombre: "Cancha 1".into(),
                        jugadores: "5 vs 5".into(),
                        rows: (0..rows as i64).map(row).collect(),
                    },
                    CanchaAgenda {
                        cancha_id: 2,
                        nombre: "Cancha 2".into(),
                        jugadores: "Fútbol 7-8-9".into(),
                        rows: vec![],
                    },
                ],
            }],
        }
    }

    #[test]
    fn renders_a_pdf() {
        let bytes = render_pdf(&agenda(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(file_name(&agenda(0)), "agenda-2025-03-02.pdf");
    }

    #[test]
    fn long_agenda_spills_onto_more_pages() {
        let short = render_pdf(&agenda(2)).unwrap();
        let long = render_pdf(&agenda(120)).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn folds_accents() {
        assert_eq!(fold_ascii("José Núñez ₡"), "Jose Nunez ?");
        assert_eq!(clip("abcdefghij", 6), "abc...");
        assert_eq!(clip("abc", 6), "abc");
    }
}
