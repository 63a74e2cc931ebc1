//! New bill form

use iced::widget::{button, column, pick_list, row, scrollable, text, text_input};
use iced::{Alignment, Element};

use billed::new_bill::controller::{NewBillController, WorkflowState};
use billed::new_bill::form::{FormEdit, NewBillForm};
use billed::state::data::BillCategory;

use crate::{Message, Route};

pub const TITLE: &str = "Envoyer une note de frais";

pub fn view<'a>(form: &'a NewBillForm, controller: &'a NewBillController) -> Element<'a, Message> {
    let edited = |edit: fn(String) -> FormEdit| move |value: String| Message::FormEdited(edit(value));

    let category = pick_list(BillCategory::ALL, Some(form.category), |category| {
        Message::FormEdited(FormEdit::Category(category))
    });

    let vat = row![
        text_input("70", &form.vat).on_input(edited(FormEdit::Vat)),
        text_input("20", &form.pct)
            .on_input(edited(FormEdit::Pct))
            .width(80),
        text("%"),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let receipt = row![
        button("Choisir un fichier").on_press(Message::PickReceipt),
        text(receipt_status(controller)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let fields = column![
        labelled("Type de dépense", category),
        labelled(
            "Nom de la dépense",
            text_input("Vol Paris Londres", &form.name).on_input(edited(FormEdit::Name)),
        ),
        labelled(
            "Date",
            text_input("AAAA-MM-JJ", &form.date).on_input(edited(FormEdit::Date)),
        ),
        labelled(
            "Montant TTC",
            text_input("348", &form.amount).on_input(edited(FormEdit::Amount)),
        ),
        labelled("TVA", vat),
        labelled(
            "Commentaire",
            text_input("", &form.commentary).on_input(edited(FormEdit::Commentary)),
        ),
        labelled("Justificatif", receipt),
    ]
    .spacing(12);

    let actions = row![
        button("Retour")
            .on_press(Message::Navigate(Route::Bills))
            .style(button::secondary),
        button("Envoyer").on_press(Message::Submit),
    ]
    .spacing(10);

    scrollable(
        column![text(TITLE).size(28), fields, actions]
            .spacing(20)
            .padding(40)
            .max_width(720.0),
    )
    .into()
}

fn labelled<'a>(label: &'a str, input: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    let input: Element<'a, Message> = input.into();
    column![text(label).size(14), input].spacing(4).into()
}

/// One line describing the receipt selection
fn receipt_status(controller: &NewBillController) -> String {
    let name = controller
        .validation()
        .file_name
        .clone()
        .unwrap_or_default();

    match controller.state() {
        WorkflowState::Empty => "Aucun fichier sélectionné".to_string(),
        WorkflowState::FileSelectedInvalid => {
            format!("{} : format non accepté (jpg, jpeg ou png)", name)
        }
        WorkflowState::Uploading { .. } => format!("{} : envoi en cours...", name),
        WorkflowState::UploadFailed => format!("{} : échec de l'envoi", name),
        WorkflowState::UploadComplete | WorkflowState::Submitting | WorkflowState::Submitted => name,
    }
}
