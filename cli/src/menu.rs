//! Role menus and the actions behind each option.
//!
//! Every menu runs the same loop: read a letter, run the matching action,
//! repeat. Any letter a menu does not know ends the program, as does the
//! end of input. Recoverable errors (bad input, missing rows, permission
//! checks, rejected writes) are reported and the loop carries on.

use std::io::{BufRead, Write};

use closetly_core::{
    ClothingItem, Discount, NewOutfit, Price, Role, UserAccount, parse_id, parse_id_list,
    require_text, validate_outfit_description,
};
use closetly_sqlite::{Closet, ClosetError, Session};
use tracing::debug;

use crate::auth::{self, LoginOutcome};
use crate::console::{Console, MAX_PROMPT_ATTEMPTS};
use crate::error::Result;
use crate::table;

/// The four option menus, one per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Personal,
    StoreOwner,
    Stylist,
    Admin,
}

impl Menu {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Personal => Menu::Personal,
            Role::StoreOwner => Menu::StoreOwner,
            Role::Stylist => Menu::Stylist,
            Role::Admin => Menu::Admin,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Menu::Personal => "Client options: ",
            Menu::StoreOwner => "Store Owner options: ",
            Menu::Stylist => "Stylist options: ",
            Menu::Admin => "Admin options: ",
        }
    }

    fn options(self) -> &'static [(char, &'static str)] {
        match self {
            Menu::Personal => &[
                ('a', "show personal clothes"),
                ('b', "show collaborative clothes"),
                ('c', "borrow from collaborative closet"),
                ('d', "style an outfit"),
                ('e', "show store inventories"),
                ('f', "lend an item to the collaborative closet"),
                ('g', "return a borrowed item"),
                ('q', "quit"),
            ],
            Menu::StoreOwner => &[
                ('a', "show inventory"),
                ('b', "add item to inventory"),
                ('c', "remove item from inventory"),
                ('s', "sell clothing item to user"),
                ('e', "change discount on item"),
                ('q', "quit"),
            ],
            Menu::Stylist => &[
                ('a', "show collaborative clothes"),
                ('b', "show store inventories"),
                ('c', "style an outfit for anyone"),
                ('q', "quit"),
            ],
            Menu::Admin => &[
                ('a', "Personal options"),
                ('b', "Store owner options"),
                ('c', "Stylist options"),
                ('d', "show all clothes"),
                ('q', "quit"),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Quit,
}

/// Signs in, then runs the menu for the account's role.
pub fn run_session<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &mut Session,
) -> Result<()> {
    if auth::login(console, session)? == LoginOutcome::SignedIn {
        let role = session.role().unwrap_or_default();
        run(Menu::for_role(role), console, session)?;
    }
    console.say("Good bye!")?;
    Ok(())
}

/// Runs one menu until the user leaves it.
pub fn run<R: BufRead, W: Write>(
    menu: Menu,
    console: &mut Console<R, W>,
    session: &Session,
) -> Result<()> {
    console.say(menu.title())?;
    for (key, label) in menu.options() {
        console.say(format!("  ({key}) {label}"))?;
    }

    loop {
        let Some(key) = console.choice("Enter an option: ")? else {
            return Ok(());
        };
        debug!(?menu, %key, "menu option");
        match dispatch(menu, key, console, session) {
            Ok(Flow::Stay) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(err) if err.is_recoverable() => console.say(format!("Sorry: {err}"))?,
            Err(err) => return Err(err),
        }
    }
}

fn dispatch<R: BufRead, W: Write>(
    menu: Menu,
    key: char,
    console: &mut Console<R, W>,
    session: &Session,
) -> Result<Flow> {
    let closet = session.closet();
    match (menu, key) {
        (Menu::Personal, 'a') => {
            let account = signed_in(session)?;
            show_personal_clothes(console, closet, &account.username)?;
        }
        (Menu::Personal, 'b') | (Menu::Stylist, 'a') => show_collaborative_clothes(console, closet)?,
        (Menu::Personal, 'c') => borrow(console, closet, signed_in(session)?)?,
        (Menu::Personal, 'd') | (Menu::Stylist, 'c') => style_outfit(console, closet)?,
        (Menu::Personal, 'e') | (Menu::Stylist, 'b') => browse_store(console, closet, None)?,
        (Menu::Personal, 'f') => lend(console, closet, signed_in(session)?)?,
        (Menu::Personal, 'g') => return_item(console, closet, signed_in(session)?)?,

        (Menu::StoreOwner, 'a') => {
            let account = signed_in(session)?;
            browse_store(console, closet, Some(&account.username))?;
        }
        (Menu::StoreOwner, 'b') => add_to_store(console, closet, signed_in(session)?)?,
        (Menu::StoreOwner, 'c') => remove_from_store(console, closet, signed_in(session)?)?,
        (Menu::StoreOwner, 's') => sell(console, closet, signed_in(session)?)?,
        (Menu::StoreOwner, 'e') => change_discount(console, closet, signed_in(session)?)?,

        (Menu::Admin, 'a') => {
            run(Menu::Personal, console, session)?;
            return Ok(Flow::Quit);
        }
        (Menu::Admin, 'b') => {
            run(Menu::StoreOwner, console, session)?;
            return Ok(Flow::Quit);
        }
        (Menu::Admin, 'c') => {
            run(Menu::Stylist, console, session)?;
            return Ok(Flow::Quit);
        }
        (Menu::Admin, 'd') => show_all_clothes(console, closet)?,

        _ => return Ok(Flow::Quit),
    }
    Ok(Flow::Stay)
}

fn signed_in(session: &Session) -> Result<&UserAccount> {
    session
        .account()
        .ok_or_else(|| ClosetError::NotFound("no account is signed in".to_string()).into())
}

fn print_table<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    heading: &str,
    table: table::Table,
) -> Result<()> {
    console.say(heading)?;
    console.print(&table.render())?;
    Ok(())
}

/// Reads an optional line; blank answers count as no answer.
fn optional_text<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    label: &str,
) -> Result<Option<String>> {
    let answer = console.prompt(label)?;
    Ok(answer
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty()))
}

// ---------------------------------------------------------------------------
// Closets
// ---------------------------------------------------------------------------

fn show_all_clothes<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
) -> Result<()> {
    let items = closet.all_clothes()?;
    print_table(
        console,
        "This is all the clothing items in the personal, collaborative, and store closets:\n",
        table::clothes_table(&items),
    )
}

fn show_personal_clothes<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    username: &str,
) -> Result<()> {
    let entries = closet.personal_clothes(username)?;
    print_table(
        console,
        "This is all the clothing items in your personal closet:\n",
        table::personal_table(&entries),
    )
}

fn show_collaborative_clothes<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
) -> Result<()> {
    let entries = closet.collab_clothes()?;
    print_table(
        console,
        "This is all the clothing items you can borrow from the collaborative closet:\n",
        table::collab_table(&entries),
    )?;

    let label = "Enter the user_id of a specific user whose available clothes you would like to see: ";
    let Some(raw) = optional_text(console, label)? else {
        return Ok(());
    };
    let user_id = parse_id(&raw)?;
    let entries = closet.user_collab_clothes(user_id)?;
    print_table(
        console,
        &format!("This is all the clothing items {user_id} has in the collaborative closet:\n"),
        table::collab_table(&entries),
    )
}

fn borrow<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    account: &UserAccount,
) -> Result<()> {
    let label = "What is the clothing ID of the item you would like to borrow?\n";
    let Some(clothing_id) = console.ask(label, parse_id)? else {
        return Ok(());
    };
    if closet.borrow(account.user_id, clothing_id)? {
        console.say("Item successfully borrowed!")?;
    } else {
        console.say("Sorry, you cannot borrow this item :(")?;
    }
    Ok(())
}

fn return_item<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    account: &UserAccount,
) -> Result<()> {
    let label = "What is the clothing ID of the item you are returning?\n";
    let Some(clothing_id) = console.ask(label, parse_id)? else {
        return Ok(());
    };
    if closet.return_item(account.user_id, clothing_id)? {
        console.say("Item returned. Thank you!")?;
    } else {
        console.say("Sorry, you are not borrowing that item.")?;
    }
    Ok(())
}

fn lend<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    account: &UserAccount,
) -> Result<()> {
    let label = "What is the clothing ID of the item you would like to lend?\n";
    let Some(clothing_id) = console.ask(label, parse_id)? else {
        return Ok(());
    };
    let condition = optional_text(console, "What condition is it in? (optional) ")?;
    if closet.lend(account.user_id, clothing_id, condition.as_deref())? {
        console.say("Item added to the collaborative closet!")?;
    } else {
        console.say("Sorry, you cannot lend this item :(")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Shows a store's inventory and offers one filter over it.
///
/// Store owners browse their own store; everyone else names one.
fn browse_store<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    own_store: Option<&str>,
) -> Result<()> {
    let store = match own_store {
        Some(store) => store.to_string(),
        None => {
            let Some(store) = optional_text(console, "Enter a store name: ")? else {
                return Ok(());
            };
            store
        }
    };

    let entries = closet.store_inventory(&store)?;
    print_table(
        console,
        &format!("This is all the clothing items currently being sold at {store}:\n"),
        table::store_table(&entries),
    )?;

    let label = "Would you like to filter by price (p), clothing type (t), or discount (d)? ";
    let filter = optional_text(console, label)?.and_then(|raw| raw.chars().next());
    match filter.map(|key| key.to_ascii_lowercase()) {
        Some('p') => {
            let Some(min) = console.ask("Minimum price (in USD): $", Price::parse)? else {
                return Ok(());
            };
            let Some(max) = console.ask("Maximum price (in USD): $", Price::parse)? else {
                return Ok(());
            };
            let entries = closet.filter_store_by_price(&store, min, max)?;
            print_table(
                console,
                &format!("This is all the clothing items at {store} priced from {min} to {max}:\n"),
                table::store_table(&entries),
            )
        }
        Some('t') => {
            let Some(clothing_type) = optional_text(console, "Clothing type: ")? else {
                return Ok(());
            };
            let entries = closet.filter_store_by_type(&store, &clothing_type)?;
            print_table(
                console,
                &format!(
                    "This is all the clothing items of the type ({clothing_type}) at {store}:\n"
                ),
                table::store_table(&entries),
            )
        }
        Some('d') => {
            let Some(min) = console.ask("Minimum discount (%): ", Discount::parse)? else {
                return Ok(());
            };
            let Some(max) = console.ask("Maximum discount (%): ", Discount::parse)? else {
                return Ok(());
            };
            let entries = closet.filter_store_by_discount(&store, min, max)?;
            print_table(
                console,
                &format!(
                    "This is all the clothing items at {store} discounted from {min} to {max}:\n"
                ),
                table::store_table(&entries),
            )
        }
        _ => Ok(()),
    }
}

fn add_to_store<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    owner: &UserAccount,
) -> Result<()> {
    let Some(clothing_id) = console.ask("Clothing ID: ", parse_id)? else {
        return Ok(());
    };
    let new_item = if closet.item_exists(clothing_id)? {
        None
    } else {
        console.say(format!("Item {clothing_id} is new to the catalog. Tell us about it."))?;
        let Some(item) = describe_item(console, clothing_id)? else {
            return Ok(());
        };
        Some(item)
    };

    let Some(price) = console.ask("Shelf price (after discount): $", Price::parse)? else {
        return Ok(());
    };
    let no_discount_if_blank = |raw: &str| {
        if raw.is_empty() {
            Ok(Discount::NONE)
        } else {
            Discount::parse(raw)
        }
    };
    let Some(discount) = console.ask("Discount (%): ", no_discount_if_blank)? else {
        return Ok(());
    };

    closet.add_to_store(&owner.username, clothing_id, price, discount, new_item.as_ref())?;
    console.say(format!("Item {clothing_id} is now for sale at {price}."))?;
    Ok(())
}

fn describe_item<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    clothing_id: i64,
) -> Result<Option<ClothingItem>> {
    let clothing_type = console.ask("Clothing type: ", |raw| {
        require_text(raw, "clothing type").map(str::to_string)
    })?;
    let Some(clothing_type) = clothing_type else {
        return Ok(None);
    };
    let mut item = ClothingItem::new(clothing_id, clothing_type);
    item.size = optional_text(console, "Size (optional): ")?;
    item.gender = optional_text(console, "Gender (optional): ")?;
    item.color = optional_text(console, "Color (optional): ")?;
    item.brand = optional_text(console, "Brand (optional): ")?;
    item.description = optional_text(console, "Description (optional): ")?;
    item.aesthetic = optional_text(console, "Aesthetic (optional): ")?;
    Ok(Some(item))
}

fn remove_from_store<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    owner: &UserAccount,
) -> Result<()> {
    let label = "Clothing ID of item you want to remove: ";
    let Some(clothing_id) = console.ask(label, parse_id)? else {
        return Ok(());
    };
    closet.remove_from_store(&owner.username, clothing_id)?;
    console.say(format!("Item {clothing_id} removed from your inventory."))?;
    Ok(())
}

fn sell<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    owner: &UserAccount,
) -> Result<()> {
    let Some(clothing_id) = console.ask("Clothing ID of item being sold: ", parse_id)? else {
        return Ok(());
    };
    let label = "User ID of user the item is being sold to: ";
    let Some(user_id) = console.ask(label, parse_id)? else {
        return Ok(());
    };
    if closet.sell_to_user(&owner.username, clothing_id, user_id)? {
        console.say(format!("Item {clothing_id} sold to user {user_id}."))?;
    } else {
        console.say("Sorry, that item could not be sold.")?;
    }
    Ok(())
}

fn change_discount<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
    owner: &UserAccount,
) -> Result<()> {
    let Some(clothing_id) = console.ask("Clothing ID of item: ", parse_id)? else {
        return Ok(());
    };
    let Some(discount) = console.ask("Desired discount (%): ", Discount::parse)? else {
        return Ok(());
    };
    let price = closet.change_sale(&owner.username, clothing_id, discount)?;
    console.say(format!("Item {clothing_id} now sells for {price} ({discount} off)."))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Outfits
// ---------------------------------------------------------------------------

fn style_outfit<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
) -> Result<()> {
    let label = "Let's style an outfit! What are the clothing ID's of the pieces you would \
                 like it to consist of? Separate them with spaces (e.g. 1 2 4)\n";
    let Some(clothing_ids) = console.ask(label, parse_id_list)? else {
        return Ok(());
    };
    let Some(outfit_id) = choose_outfit_id(console, closet)? else {
        return Ok(());
    };

    let label = "How would you describe this outfit? (250 characters or less)\n";
    let description = console.ask(label, |raw| {
        validate_outfit_description(raw).map(|()| raw.to_string())
    })?;
    let Some(description) = description else {
        return Ok(());
    };
    let label = "What is the \"vibe\" of this outfit? (i.e.: business casual, going out, etc.)\n";
    let Some(vibe) = console.prompt(label)? else {
        return Ok(());
    };

    let rows = closet.create_outfit(&NewOutfit {
        outfit_id,
        clothing_ids,
        description,
        vibe: vibe.trim().to_string(),
    })?;
    print_table(
        console,
        &format!("Outfit {outfit_id} is ready:\n"),
        table::outfit_table(&rows),
    )
}

fn choose_outfit_id<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    closet: Closet<'_>,
) -> Result<Option<i64>> {
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let label = "Assign an outfit ID (integer) to this outfit: ";
        let Some(outfit_id) = console.ask(label, parse_id)? else {
            return Ok(None);
        };
        if !closet.check_outfit_id(outfit_id)? {
            return Ok(Some(outfit_id));
        }
        console.say(format!("Outfit ID {outfit_id} is already taken."))?;
    }
    Ok(None)
}
