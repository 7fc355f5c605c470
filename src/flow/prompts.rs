//! Customer-facing text, keyed by language.
//!
//! Step logic is written once; only the text looked up here varies by
//! language. The table is an exhaustive `match`, so adding a prompt without
//! translating it for every language does not compile. Placeholders use
//! `{name}` syntax and are filled by [`render`].

use super::language::Language;

/// A piece of customer-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    Welcome,
    LanguageMenu,
    MainMenu,
    InvalidOption,
    QuoteDetailsRequest,
    QuoteDetailsIncomplete,
    QuoteSummary,
    EstimatePending,
    QuoteMenu,
    QuoteAccepted,
    OfferRequest,
    OfferInvalid,
    OfferReceived,
    OfferMenu,
    NoActiveQuote,
    BookingDetailsRequest,
    BookingDetailsIncomplete,
    BookingConfirm,
    BookingConfirmMenu,
    BookingCreated,
    BookingMenu,
    BookingCancelled,
    BookingDiscarded,
    StatusRequest,
    StatusInvalid,
    StatusNotFound,
    QuoteStatus,
    BookingStatus,
    StatusPending,
    StatusAccepted,
    StatusOffered,
    StatusCancelled,
    QuestionRequest,
    QuestionFollowUp,
    AiUnavailable,
    AgentRequest,
    AgentRequested,
    AgentUnavailable,
    AgentFollowUpMenu,
    AgentStillWaiting,
    Goodbye,
    SystemError,
}

impl Prompt {
    pub const ALL: [Prompt; 42] = [
        Prompt::Welcome,
        Prompt::LanguageMenu,
        Prompt::MainMenu,
        Prompt::InvalidOption,
        Prompt::QuoteDetailsRequest,
        Prompt::QuoteDetailsIncomplete,
        Prompt::QuoteSummary,
        Prompt::EstimatePending,
        Prompt::QuoteMenu,
        Prompt::QuoteAccepted,
        Prompt::OfferRequest,
        Prompt::OfferInvalid,
        Prompt::OfferReceived,
        Prompt::OfferMenu,
        Prompt::NoActiveQuote,
        Prompt::BookingDetailsRequest,
        Prompt::BookingDetailsIncomplete,
        Prompt::BookingConfirm,
        Prompt::BookingConfirmMenu,
        Prompt::BookingCreated,
        Prompt::BookingMenu,
        Prompt::BookingCancelled,
        Prompt::BookingDiscarded,
        Prompt::StatusRequest,
        Prompt::StatusInvalid,
        Prompt::StatusNotFound,
        Prompt::QuoteStatus,
        Prompt::BookingStatus,
        Prompt::StatusPending,
        Prompt::StatusAccepted,
        Prompt::StatusOffered,
        Prompt::StatusCancelled,
        Prompt::QuestionRequest,
        Prompt::QuestionFollowUp,
        Prompt::AiUnavailable,
        Prompt::AgentRequest,
        Prompt::AgentRequested,
        Prompt::AgentUnavailable,
        Prompt::AgentFollowUpMenu,
        Prompt::AgentStillWaiting,
        Prompt::Goodbye,
        Prompt::SystemError,
    ];
}

/// Fill `{name}` placeholders in `template` in a single left-to-right pass.
///
/// Substituted values are never scanned again, so customer text that looks
/// like a placeholder is kept as written. Unknown placeholders are left as is.
pub fn render(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Look up the text for `prompt` in `language`.
pub fn text(language: Language, prompt: Prompt) -> &'static str {
    match language {
        Language::English => english(prompt),
        Language::Shona => shona(prompt),
        Language::Ndebele => ndebele(prompt),
    }
}

const WELCOME: &str = "\
Welcome to {business}! / Mauya ku{business}! / Siyalemukela ku{business}!

Please choose your language / Sarudzai mutauro / Khetha ulimi:
1. English
2. ChiShona
3. isiNdebele";

const LANGUAGE_MENU: &str = "\
Please choose your language / Sarudzai mutauro / Khetha ulimi (1, 2, 3):
1. English
2. ChiShona
3. isiNdebele";

fn english(prompt: Prompt) -> &'static str {
    match prompt {
        Prompt::Welcome => WELCOME,
        Prompt::LanguageMenu => LANGUAGE_MENU,
        Prompt::MainMenu => "\
Main Menu - how can we help you today?
1. Request a quote
2. Book a service
3. Check quote or booking status
4. Ask a question
5. Talk to an agent
6. Change language",
        Prompt::InvalidOption => "Sorry, I didn't understand that. Please reply with one of the numbers below.",
        Prompt::QuoteDetailsRequest => "\
To prepare your quote, please send the following details, each on a new line:
1. Location
2. Depth required (e.g. 40m)
3. Purpose (Domestic / Irrigation / Commercial)
4. Has a water survey been done? (Yes/No)",
        Prompt::QuoteDetailsIncomplete => "We need all 4 details, each on a separate line.",
        Prompt::QuoteSummary => "\
Thank you! Your quote reference is {id}.
Location: {location}
Depth: {depth}
Purpose: {purpose}
Survey done: {survey}
Estimated cost: {estimate}",
        Prompt::EstimatePending => "to be confirmed by our team",
        Prompt::QuoteMenu => "\
What would you like to do next?
1. Accept quote and book
2. Make a price offer
3. Talk to an agent
4. Main menu",
        Prompt::QuoteAccepted => "Great, quote {id} has been accepted.",
        Prompt::OfferRequest => "Please enter the amount you would like to offer (e.g. 1500).",
        Prompt::OfferInvalid => "Please enter a valid amount using numbers only (e.g. 1500).",
        Prompt::OfferReceived => "Your offer of ${amount} for quote {id} has been sent to our team. We will get back to you shortly.",
        Prompt::OfferMenu => "\
1. Book a service
2. Main menu",
        Prompt::NoActiveQuote => "You do not have an active quote. Please request a quote first.",
        Prompt::BookingDetailsRequest => "\
To book, please send the following, each on a new line:
1. Full name
2. Preferred date
3. Site address (optional)",
        Prompt::BookingDetailsIncomplete => "Please send at least your full name and preferred date, each on a new line.",
        Prompt::BookingConfirm => "\
Please confirm your booking:
Name: {name}
Date: {date}
Address: {address}",
        Prompt::BookingConfirmMenu => "\
1. Confirm
2. Cancel",
        Prompt::BookingCreated => "Your booking is confirmed! Booking reference: {id}. Our team will contact you to finalise the details.",
        Prompt::BookingMenu => "\
1. Main menu
2. Cancel this booking
3. Talk to an agent
4. Exit",
        Prompt::BookingCancelled => "Booking {id} has been cancelled.",
        Prompt::BookingDiscarded => "Your booking request has been discarded.",
        Prompt::StatusRequest => "Please enter your quote or booking reference (8 characters), or 0 for the main menu.",
        Prompt::StatusInvalid => "That does not look like a reference. References have 8 letters and numbers, e.g. AB12CD34. Reply 0 for the main menu.",
        Prompt::StatusNotFound => "We could not find a quote or booking with reference {id}. Please check and try again, or reply 0 for the main menu.",
        Prompt::QuoteStatus => "Quote {id} is {status}.",
        Prompt::BookingStatus => "Booking {id} is {status}.",
        Prompt::StatusPending => "pending",
        Prompt::StatusAccepted => "accepted",
        Prompt::StatusOffered => "under review (offer received)",
        Prompt::StatusCancelled => "cancelled",
        Prompt::QuestionRequest => "Please type your question, or reply 0 for the main menu.",
        Prompt::QuestionFollowUp => "You can ask another question, or reply 0 for the main menu.",
        Prompt::AiUnavailable => "Sorry, I can't answer that right now. Please try again later or talk to an agent from the main menu.",
        Prompt::AgentRequest => "Please briefly describe what you need help with and an agent will be with you.",
        Prompt::AgentRequested => "Thank you. An agent has been notified and will reply to you here shortly.",
        Prompt::AgentUnavailable => "\
Sorry, all our agents are busy right now.
1. Main menu
2. Keep waiting",
        Prompt::AgentFollowUpMenu => "\
1. Main menu
2. Keep waiting",
        Prompt::AgentStillWaiting => "No problem, we'll keep trying to reach an agent for you.",
        Prompt::Goodbye => "Thank you for contacting {business}. Send hi at any time to start again.",
        Prompt::SystemError => "Sorry, something went wrong on our side. Please try again in a moment.",
    }
}

fn shona(prompt: Prompt) -> &'static str {
    match prompt {
        Prompt::Welcome => WELCOME,
        Prompt::LanguageMenu => LANGUAGE_MENU,
        Prompt::MainMenu => "\
Menyu Huru - tingakubatsirai sei nhasi?
1. Kukumbira mutengo
2. Kubhuka basa
3. Kuona mamiriro equote kana bhuking
4. Kubvunza mubvunzo
5. Kutaura nemumiriri
6. Kuchinja mutauro",
        Prompt::InvalidOption => "Ndine urombo, handina kunzwisisa. Ndapota pindurai nenhamba iri pazasi.",
        Prompt::QuoteDetailsRequest => "\
Kuti tikugadzirirei mutengo, tumirai zvinotevera, chimwe nechimwe pamutsara wacho:
1. Nzvimbo
2. Kudzika kunodiwa (semuenzaniso 40m)
3. Chinangwa (Pamba / Kudiridza / Bhizinesi)
4. Ongororo yemvura yakaitwa here? (Hongu/Kwete)",
        Prompt::QuoteDetailsIncomplete => "Tinoda zvinhu zvose 4, chimwe nechimwe pamutsara wacho.",
        Prompt::QuoteSummary => "\
Tatenda! Nhamba yequote yenyu ndi {id}.
Nzvimbo: {location}
Kudzika: {depth}
Chinangwa: {purpose}
Ongororo yakaitwa: {survey}
Mutengo unofungidzirwa: {estimate}",
        Prompt::EstimatePending => "uchasimbiswa nechikwata chedu",
        Prompt::QuoteMenu => "\
Munoda kuita sei zvino?
1. Kubvuma quote nekubhuka
2. Kupa mutengo wenyu
3. Kutaura nemumiriri
4. Menyu huru",
        Prompt::QuoteAccepted => "Zvakanaka, quote {id} yabvumwa.",
        Prompt::OfferRequest => "Ndapota nyorai mari yamunoda kupa (semuenzaniso 1500).",
        Prompt::OfferInvalid => "Ndapota nyorai mari chaiyo muchishandisa nhamba chete (semuenzaniso 1500).",
        Prompt::OfferReceived => "Mutengo wenyu we ${amount} wequote {id} watumirwa kuchikwata chedu. Tichakupindurai munguva pfupi.",
        Prompt::OfferMenu => "\
1. Kubhuka basa
2. Menyu huru",
        Prompt::NoActiveQuote => "Hamuna quote iripo. Ndapota kumbirai quote kutanga.",
        Prompt::BookingDetailsRequest => "\
Kuti mubhuke, tumirai zvinotevera, chimwe nechimwe pamutsara wacho:
1. Zita rizere
2. Zuva ramunoda
3. Kero yenzvimbo (hazvimanikidzwe)",
        Prompt::BookingDetailsIncomplete => "Ndapota tumirai zita renyu rizere nezuva ramunoda, chimwe nechimwe pamutsara wacho.",
        Prompt::BookingConfirm => "\
Ndapota simbisai bhuking yenyu:
Zita: {name}
Zuva: {date}
Kero: {address}",
        Prompt::BookingConfirmMenu => "\
1. Simbisa
2. Kanzura",
        Prompt::BookingCreated => "Bhuking yenyu yasimbiswa! Nhamba yebhuking: {id}. Chikwata chedu chichakubatai kuti tipedzise zvese.",
        Prompt::BookingMenu => "\
1. Menyu huru
2. Kanzura bhuking iyi
3. Kutaura nemumiriri
4. Buda",
        Prompt::BookingCancelled => "Bhuking {id} yakanzurwa.",
        Prompt::BookingDiscarded => "Chikumbiro chenyu chebhuking chabviswa.",
        Prompt::StatusRequest => "Ndapota nyorai nhamba yequote kana yebhuking (mavara 8), kana 0 kudzokera kumenyu huru.",
        Prompt::StatusInvalid => "Iyoyo haisi nhamba yakakodzera. Nhamba dzine mavara nenhamba 8, semuenzaniso AB12CD34. Pindurai 0 kudzokera kumenyu huru.",
        Prompt::StatusNotFound => "Hatina kuwana quote kana bhuking ine nhamba {id}. Ndapota tarisai muedze zvakare, kana pindurai 0 kudzokera kumenyu huru.",
        Prompt::QuoteStatus => "Quote {id}: {status}.",
        Prompt::BookingStatus => "Bhuking {id}: {status}.",
        Prompt::StatusPending => "ichiri kumirira",
        Prompt::StatusAccepted => "yabvumwa",
        Prompt::StatusOffered => "iri kuongororwa (mutengo wenyu wagamuchirwa)",
        Prompt::StatusCancelled => "yakanzurwa",
        Prompt::QuestionRequest => "Ndapota nyorai mubvunzo wenyu, kana pindurai 0 kudzokera kumenyu huru.",
        Prompt::QuestionFollowUp => "Munogona kubvunza mumwe mubvunzo, kana pindurai 0 kudzokera kumenyu huru.",
        Prompt::AiUnavailable => "Ndine urombo, handikwanise kupindura izvozvi. Edzai zvakare gare gare kana taurai nemumiriri kubva kumenyu huru.",
        Prompt::AgentRequest => "Ndapota tsanangurai muchidimbu zvamunoda rubatsiro pazviri uye mumiriri achakubatsirai.",
        Prompt::AgentRequested => "Tatenda. Mumiriri aziviswa uye achakupindurai pano munguva pfupi.",
        Prompt::AgentUnavailable => "\
Ndine urombo, vamiriri vedu vese vakabatikana izvozvi.
1. Menyu huru
2. Ramba wakamirira",
        Prompt::AgentFollowUpMenu => "\
1. Menyu huru
2. Ramba wakamirira",
        Prompt::AgentStillWaiting => "Hazvina mhosva, tichaedza kukuwanirai mumiriri.",
        Prompt::Goodbye => "Tatenda nekubata {business}. Tumirai hi chero nguva kuti titange patsva.",
        Prompt::SystemError => "Ndine urombo, pane chakanganisika kwatiri. Ndapota edzai zvakare munguva pfupi.",
    }
}

fn ndebele(prompt: Prompt) -> &'static str {
    match prompt {
        Prompt::Welcome => WELCOME,
        Prompt::LanguageMenu => LANGUAGE_MENU,
        Prompt::MainMenu => "\
Imenyu Enkulu - singakunceda njani lamuhla?
1. Cela intengo
2. Bhukha umsebenzi
3. Khangela isimo sequote kumbe sebhukhingi
4. Buza umbuzo
5. Khuluma lomsebenzi wethu
6. Ntshintsha ulimi",
        Prompt::InvalidOption => "Uxolo, angizwisisanga. Ngicela uphendule ngenombolo engaphansi.",
        Prompt::QuoteDetailsRequest => "\
Ukuze silungise intengo yakho, ngicela uthumele lokhu, ngayinye emgqeni wayo:
1. Indawo
2. Ukujula okufunakalayo (isibonelo 40m)
3. Injongo (Ekhaya / Ukuthelelisa / Ibhizinisi)
4. Ukuhlolwa kwamanzi sekwenziwe yini? (Yebo/Hatshi)",
        Prompt::QuoteDetailsIncomplete => "Sidinga imininingwane yonke emi 4, ngayinye emgqeni wayo.",
        Prompt::QuoteSummary => "\
Siyabonga! Inombolo yequote yakho ngu {id}.
Indawo: {location}
Ukujula: {depth}
Injongo: {purpose}
Ukuhlolwa kwenziwe: {survey}
Intengo eqagelwayo: {estimate}",
        Prompt::EstimatePending => "izaqinisekiswa yiqembu lethu",
        Prompt::QuoteMenu => "\
Ufuna ukwenzani okulandelayo?
1. Vuma iquote ubhukhe
2. Nika intengo yakho
3. Khuluma lomsebenzi wethu
4. Imenyu enkulu",
        Prompt::QuoteAccepted => "Kuhle, iquote {id} isivunyiwe.",
        Prompt::OfferRequest => "Ngicela ubhale imali ofuna ukuyinika (isibonelo 1500).",
        Prompt::OfferInvalid => "Ngicela ubhale imali efaneleyo usebenzisa izinombolo kuphela (isibonelo 1500).",
        Prompt::OfferReceived => "Intengo yakho ka ${amount} yequote {id} ithunyelwe eqenjini lethu. Sizakuphendula masinyane.",
        Prompt::OfferMenu => "\
1. Bhukha umsebenzi
2. Imenyu enkulu",
        Prompt::NoActiveQuote => "Awulayo iquote ekhona. Ngicela uqale ucele iquote.",
        Prompt::BookingDetailsRequest => "\
Ukuze ubhukhe, ngicela uthumele lokhu, ngayinye emgqeni wayo:
1. Ibizo eligcweleyo
2. Ilanga olifunayo
3. Ikheli lendawo (akumqoka)",
        Prompt::BookingDetailsIncomplete => "Ngicela uthumele okungenani ibizo lakho eligcweleyo lelanga olifunayo, ngayinye emgqeni wayo.",
        Prompt::BookingConfirm => "\
Ngicela uqinisekise ibhukhingi yakho:
Ibizo: {name}
Ilanga: {date}
Ikheli: {address}",
        Prompt::BookingConfirmMenu => "\
1. Qinisekisa
2. Yekela",
        Prompt::BookingCreated => "Ibhukhingi yakho iqinisekisiwe! Inombolo yebhukhingi: {id}. Iqembu lethu lizakuthinta ukuze siqedise konke.",
        Prompt::BookingMenu => "\
1. Imenyu enkulu
2. Yekela le bhukhingi
3. Khuluma lomsebenzi wethu
4. Phuma",
        Prompt::BookingCancelled => "Ibhukhingi {id} isiyekelwe.",
        Prompt::BookingDiscarded => "Isicelo sakho sebhukhingi sesisusiwe.",
        Prompt::StatusRequest => "Ngicela ubhale inombolo yequote kumbe yebhukhingi (izimpawu ezi 8), kumbe 0 ukubuyela kumenyu enkulu.",
        Prompt::StatusInvalid => "Leyo kayisiyo inombolo efaneleyo. Izinombolo zilezimpawu lezinombolo ezi 8, isibonelo AB12CD34. Phendula ngo 0 ukubuyela kumenyu enkulu.",
        Prompt::StatusNotFound => "Asiyitholanga iquote kumbe ibhukhingi elenombolo {id}. Ngicela uhlole uzame futhi, kumbe uphendule ngo 0 ukubuyela kumenyu enkulu.",
        Prompt::QuoteStatus => "Iquote {id}: {status}.",
        Prompt::BookingStatus => "Ibhukhingi {id}: {status}.",
        Prompt::StatusPending => "isalindile",
        Prompt::StatusAccepted => "ivunyiwe",
        Prompt::StatusOffered => "iyahlolwa (intengo yakho yamukelwe)",
        Prompt::StatusCancelled => "iyekelwe",
        Prompt::QuestionRequest => "Ngicela ubhale umbuzo wakho, kumbe uphendule ngo 0 ukubuyela kumenyu enkulu.",
        Prompt::QuestionFollowUp => "Ungabuza omunye umbuzo, kumbe uphendule ngo 0 ukubuyela kumenyu enkulu.",
        Prompt::AiUnavailable => "Uxolo, angikwazi ukuphendula khathesi. Zama futhi emuva kwesikhathi kumbe ukhulume lomsebenzi wethu kusuka kumenyu enkulu.",
        Prompt::AgentRequest => "Ngicela uchasise kafitshane ukuthi udinga usizo ngani, umsebenzi wethu uzakusiza.",
        Prompt::AgentRequested => "Siyabonga. Umsebenzi wethu usetshelwe, uzakuphendula lapha masinyane.",
        Prompt::AgentUnavailable => "\
Uxolo, bonke abasebenzi bethu balomsebenzi khathesi.
1. Imenyu enkulu
2. Qhubeka ulindile",
        Prompt::AgentFollowUpMenu => "\
1. Imenyu enkulu
2. Qhubeka ulindile",
        Prompt::AgentStillWaiting => "Kulungile, sizaqhubeka sizama ukukutholela umsebenzi wethu.",
        Prompt::Goodbye => "Siyabonga ngokuthinta {business}. Thumela hi nxa ufuna ukuqala kutsha.",
        Prompt::SystemError => "Uxolo, kukhona okungahambanga kuhle kithi. Ngicela uzame futhi masinyane.",
    }
}
