//! Bill list page: table, loading and error states, receipt viewer

use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, row, scrollable, text, Column, Row};
use iced::{Alignment, Element, Length};

use billed::bills::controller::{BillRow, ReceiptModal, MODAL_WIDTH};
use billed::bills::presenter::{BillTable, BillsView};

use super::modal::modal;
use crate::{Message, Route};

/// Build the page for a presented view, with the receipt viewer on top
/// when it is open
pub fn view(page: BillsView, receipt: &ReceiptModal) -> Element<'_, Message> {
    let content: Element<'_, Message> = match page {
        BillsView::Loading => centered(text("Loading...").size(24)),
        BillsView::Error(error) => centered(
            column![text("Erreur").size(32), text(error.message).size(20)]
                .spacing(10)
                .align_x(Alignment::Center),
        ),
        BillsView::Table(table) => bill_table(table),
    };

    if receipt.is_visible() {
        modal(content, receipt_viewer(receipt), Message::CloseReceipt)
    } else {
        content
    }
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn bill_table<'a>(table: BillTable) -> Element<'a, Message> {
    let header = row![
        text(table.title).size(28).width(Length::Fill),
        button(table.new_bill_label)
            .on_press(Message::Navigate(Route::NewBill))
            .padding(10),
    ]
    .align_y(Alignment::Center);

    let columns = table
        .columns
        .iter()
        .fold(Row::new().spacing(10), |columns, title| {
            columns.push(text(*title).size(16).width(Length::FillPortion(2)))
        });

    let rows = table
        .rows
        .into_iter()
        .fold(Column::new().spacing(6), |rows, bill| rows.push(bill_row(bill)));

    column![header, columns, scrollable(rows)]
        .spacing(20)
        .padding(40)
        .into()
}

fn bill_row<'a>(bill: BillRow) -> Element<'a, Message> {
    let action: Element<'a, Message> = match bill.file_url {
        Some(_) => button("Voir")
            .on_press(Message::ViewReceipt(bill.clone()))
            .padding(4)
            .into(),
        None => text("-").into(),
    };

    row![
        cell(bill.category),
        cell(bill.name),
        cell(bill.date),
        cell(bill.amount),
        cell(bill.status),
        container(action).width(Length::FillPortion(2)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

fn cell<'a>(value: String) -> Element<'a, Message> {
    text(value).width(Length::FillPortion(2)).into()
}

fn receipt_viewer(receipt: &ReceiptModal) -> Element<'_, Message> {
    let body: Element<'_, Message> = match receipt.image() {
        Some(receipt_image) => match receipt_image.local_path() {
            Some(path) => Image::<Handle>::new(Handle::from_path(path))
                .width(receipt_image.width)
                .into(),
            None => text(receipt_image.remote_caption().unwrap_or_default())
                .size(14)
                .into(),
        },
        None => text("Aucun justificatif").into(),
    };

    container(
        column![
            row![
                text("Justificatif").size(20).width(Length::Fill),
                button("×").on_press(Message::CloseReceipt),
            ]
            .align_y(Alignment::Center),
            body,
        ]
        .spacing(15),
    )
    .width(MODAL_WIDTH)
    .padding(20)
    .style(container::rounded_box)
    .into()
}
